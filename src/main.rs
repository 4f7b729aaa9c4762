use iced::widget::image::Handle;
use iced::widget::{
    button, canvas, column, container, row, scrollable, slider, text, Column, Image,
};
use iced::{event, window, Alignment, Element, Event, Length, Subscription, Task, Theme};
use rfd::FileDialog;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use image::RgbaImage;
use lumacraft::codec::{self, DecodedUpload};
use lumacraft::config::EditorConfig;
use lumacraft::error::EditorError;
use lumacraft::segment::{ModelSegmenter, Segmenter};
use lumacraft::state::{Editor, EditorState, Filter, Outcome, Status, Ticket};
use lumacraft::swatch::{KmeansQuantizer, Quantizer};
use lumacraft::Swatch;

mod ui;

/// Extensions offered by the open dialog
const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

/// Main application state
struct Lumacraft {
    editor: Editor,
    segmenter: Arc<dyn Segmenter>,
    quantizer: Arc<dyn Quantizer>,
    /// Preview texture, rebuilt when the editor's preview version changes
    preview: Option<(u64, Handle)>,
    /// An upload is being read and decoded
    loading: bool,
    /// Last copy acknowledgement and its sequence number
    copied: Option<(u64, String)>,
    copy_seq: u64,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    OpenImage,
    FileDropped(PathBuf),
    ImageLoaded(Result<DecodedUpload, EditorError>),
    FilterChanged(Filter, i32),
    ResetFilters,
    RemoveBackground,
    BackgroundRemoved(Ticket, Result<Arc<RgbaImage>, EditorError>),
    PaletteExtracted(Ticket, Result<Vec<Swatch>, EditorError>),
    Revert,
    Export,
    Exported(Result<PathBuf, EditorError>),
    CopyCss,
    CopyHex(String),
    CopyAckExpired(u64),
}

impl Lumacraft {
    fn new() -> (Self, Task<Message>) {
        let config = match EditorConfig::load() {
            Ok(config) => config,
            Err(err) => {
                log::warn!("{}; using defaults", err);
                EditorConfig::default()
            }
        };
        log::info!(
            "lumacraft started (upload limit {} bytes, {} palette colors)",
            config.max_upload_bytes,
            config.palette_size
        );

        let segmenter: Arc<dyn Segmenter> = Arc::new(ModelSegmenter::from_config(&config.segmentation));
        let quantizer: Arc<dyn Quantizer> = Arc::new(KmeansQuantizer::new(config.quantizer.clone()));

        (
            Lumacraft {
                editor: Editor::new(config),
                segmenter,
                quantizer,
                preview: None,
                loading: false,
                copied: None,
                copy_seq: 0,
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        let task = match message {
            Message::OpenImage => {
                let file = FileDialog::new()
                    .set_title("Choose an image")
                    .add_filter("Images", &IMAGE_EXTENSIONS)
                    .pick_file();

                match file {
                    Some(path) => self.load(path),
                    None => Task::none(),
                }
            }
            Message::FileDropped(path) => self.load(path),
            Message::ImageLoaded(result) => {
                self.loading = false;
                if self.editor.accept_upload(result).is_ok() {
                    self.copied = None;
                }
                self.schedule_palette()
            }
            Message::FilterChanged(filter, value) => {
                self.editor.set_filter(filter, value);
                Task::none()
            }
            Message::ResetFilters => {
                self.editor.reset_filters();
                Task::none()
            }
            Message::RemoveBackground => match self.editor.begin_remove_background() {
                Ok(job) => {
                    let segmenter = self.segmenter.clone();
                    let ticket = job.ticket;
                    Task::perform(
                        async move {
                            tokio::task::spawn_blocking(move || job.run(segmenter.as_ref()))
                                .await
                                .map_err(|e| EditorError::Segmentation(format!("Task join error: {}", e)))?
                        },
                        move |result| Message::BackgroundRemoved(ticket, result),
                    )
                }
                Err(_) => Task::none(),
            },
            Message::BackgroundRemoved(ticket, result) => {
                match self.editor.finish_remove_background(ticket, result) {
                    Outcome::Applied => self.schedule_palette(),
                    Outcome::Stale => Task::none(),
                }
            }
            Message::PaletteExtracted(ticket, result) => {
                self.editor.finish_palette(ticket, result);
                Task::none()
            }
            Message::Revert => {
                if self.editor.revert_to_original().is_ok() {
                    self.schedule_palette()
                } else {
                    Task::none()
                }
            }
            Message::Export => self.export(),
            Message::Exported(result) => {
                self.editor.finish_export(result);
                Task::none()
            }
            Message::CopyCss => {
                let css = self.editor.css_snippet().to_string();
                if css.is_empty() {
                    Task::none()
                } else {
                    self.copy(css, "Copied")
                }
            }
            Message::CopyHex(hex) => {
                let label = format!("Copied {}", hex);
                self.copy(hex, &label)
            }
            Message::CopyAckExpired(seq) => {
                if matches!(&self.copied, Some((current, _)) if *current == seq) {
                    self.copied = None;
                }
                Task::none()
            }
        };

        self.sync_preview();
        task
    }

    fn load(&mut self, path: PathBuf) -> Task<Message> {
        if self.loading {
            return Task::none();
        }
        self.loading = true;
        log::info!("loading {}", path.display());

        let limit = self.editor.config().max_upload_bytes;
        Task::perform(
            async move {
                let upload = codec::read_upload(path, limit).await?;
                codec::decode_async(upload, limit).await
            },
            Message::ImageLoaded,
        )
    }

    /// Launch the palette job for the current base, if one is due
    fn schedule_palette(&mut self) -> Task<Message> {
        let Some(job) = self.editor.take_palette_job() else {
            return Task::none();
        };
        let quantizer = self.quantizer.clone();
        let ticket = job.ticket;

        Task::perform(
            async move {
                tokio::task::spawn_blocking(move || job.run(quantizer.as_ref()))
                    .await
                    .map_err(|e| EditorError::Extraction(format!("Task join error: {}", e)))?
            },
            move |result| Message::PaletteExtracted(ticket, result),
        )
    }

    fn export(&mut self) -> Task<Message> {
        let job = match self.editor.export_job() {
            Ok(job) => job,
            Err(err) => {
                self.editor.finish_export(Err(err));
                return Task::none();
            }
        };

        let target = FileDialog::new()
            .set_title("Export PNG")
            .set_file_name(job.file_name())
            .add_filter("PNG", &["png"])
            .save_file();

        match target {
            Some(path) => Task::perform(
                async move {
                    let export = tokio::task::spawn_blocking(move || job.run())
                        .await
                        .map_err(|e| EditorError::Export(format!("Task join error: {}", e)))??;
                    export.save(path).await
                },
                Message::Exported,
            ),
            None => Task::none(),
        }
    }

    fn copy(&mut self, contents: String, label: &str) -> Task<Message> {
        self.copy_seq += 1;
        let seq = self.copy_seq;
        self.copied = Some((seq, label.to_string()));

        let ack = Duration::from_millis(self.editor.config().copy_ack_ms);
        Task::batch([
            iced::clipboard::write(contents),
            Task::perform(tokio::time::sleep(ack), move |_| Message::CopyAckExpired(seq)),
        ])
    }

    fn sync_preview(&mut self) {
        let version = self.editor.preview_version();
        if matches!(&self.preview, Some((cached, _)) if *cached == version) {
            return;
        }

        self.preview = self.editor.preview().map(|image| {
            let handle = Handle::from_rgba(image.width(), image.height(), image.as_raw().clone());
            (version, handle)
        });
    }

    fn is_busy(&self) -> bool {
        self.loading || self.editor.state() == EditorState::Processing
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let busy = self.is_busy();
        let has_image = self.editor.session().is_some();
        let enabled = |message: Message| (!busy && has_image).then_some(message);

        let toolbar = row![
            button("Open image")
                .on_press_maybe((!busy).then_some(Message::OpenImage))
                .padding(10),
            button("Remove background")
                .on_press_maybe(enabled(Message::RemoveBackground))
                .padding(10),
            button("Revert")
                .on_press_maybe(enabled(Message::Revert))
                .padding(10),
            button("Export PNG")
                .on_press_maybe(enabled(Message::Export))
                .padding(10),
        ]
        .spacing(10);

        let preview: Element<Message> = match &self.preview {
            Some((_, handle)) => Image::new(handle.clone())
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            None => container(text("Open or drop a PNG, JPEG or WebP image").size(18))
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .into(),
        };

        let content = column![
            text("Lumacraft").size(36),
            toolbar,
            self.status_line(),
            row![
                container(preview).width(Length::FillPortion(3)).height(Length::Fill),
                scrollable(self.side_panel(has_image && !busy)).width(Length::FillPortion(2)),
            ]
            .spacing(20)
            .height(Length::Fill),
        ]
        .spacing(16)
        .padding(24);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn status_line(&self) -> Element<Message> {
        let message = if self.loading {
            Some("Loading image")
        } else {
            self.editor.status().message()
        };
        let line = text(message.unwrap_or("")).size(16);

        match self.editor.status() {
            Status::Error(_) if !self.loading => line.style(text::danger).into(),
            Status::Success(_) if !self.loading => line.style(text::success).into(),
            _ => line.into(),
        }
    }

    fn side_panel(&self, enabled: bool) -> Column<Message> {
        let filters = self.editor.filters();
        let mut panel = column![text("Adjustments").size(20)].spacing(12);

        for filter in Filter::ALL {
            let value = filters.get(filter);
            let control: Element<Message> = if enabled {
                slider(filter.range(), value, move |v| Message::FilterChanged(filter, v))
                    .step(1)
                    .into()
            } else {
                text("").into()
            };
            panel = panel.push(
                column![text(format!("{}: {:+}%", filter.label(), value)).size(14), control].spacing(4),
            );
        }
        panel = panel.push(
            button("Reset filters")
                .on_press_maybe((enabled && !filters.is_unedited()).then_some(Message::ResetFilters)),
        );

        let palette = self.editor.palette();
        panel = panel.push(text("Palette").size(20));
        if palette.is_empty() {
            panel = panel.push(text("No palette yet").size(14));
        } else {
            panel = panel.push(
                canvas(ui::swatches::SwatchStrip::new(palette))
                    .width(Length::Fill)
                    .height(Length::Fixed(90.0)),
            );
        }

        let css = self.editor.css_snippet();
        if !css.is_empty() {
            let copy_label = match &self.copied {
                Some((_, label)) => label.as_str(),
                None => "Copy CSS",
            };
            panel = panel.push(
                column![
                    row![
                        text("CSS").size(20),
                        button(text(copy_label)).on_press(Message::CopyCss),
                    ]
                    .spacing(12)
                    .align_y(Alignment::Center),
                    container(text(css).font(iced::Font::MONOSPACE).size(13)).padding(10),
                ]
                .spacing(8),
            );
        } else if let Some((_, label)) = &self.copied {
            panel = panel.push(text(label.as_str()).size(14));
        }

        let ideas = self.editor.layout_ideas();
        if !ideas.is_empty() {
            panel = panel.push(text("Layout ideas").size(20));
            for idea in ideas {
                panel = panel.push(text(format!("- {}", idea)).size(14));
            }
        }

        panel
    }

    fn subscription(&self) -> Subscription<Message> {
        event::listen_with(|event, _status, _window| match event {
            Event::Window(window::Event::FileDropped(path)) => Some(Message::FileDropped(path)),
            _ => None,
        })
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    iced::application("Lumacraft", Lumacraft::update, Lumacraft::view)
        .theme(Lumacraft::theme)
        .subscription(Lumacraft::subscription)
        .centered()
        .run_with(Lumacraft::new)
}
