use std::path::Path;

use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui_image::picker::Picker;
use ratatui_image::protocol::Protocol as ImageProtocol;
use ratatui_image::{Image as ImageWidget, Resize};

#[derive(Debug, Clone, PartialEq, Eq)]
struct CoverKey {
    path: Option<String>,
    area: Rect,
}

/// Caches the encoded cover of the selected book so redraws do not decode
/// the image again.
#[derive(Default)]
pub(crate) struct CoverCache {
    key: Option<CoverKey>,
    protocol: Option<ImageProtocol>,
    placeholder: Option<String>,
}

impl CoverCache {
    pub(crate) fn draw(
        &mut self,
        picker: &Picker,
        image_path: Option<&str>,
        area: Rect,
        frame: &mut ratatui::Frame,
    ) {
        let block = Block::default().borders(Borders::ALL).title("Cover");
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let key = CoverKey {
            path: image_path.map(str::to_string),
            area: inner,
        };
        if self.key.as_ref() != Some(&key) {
            self.load(picker, image_path, inner);
            self.key = Some(key);
        }

        if let Some(protocol) = self.protocol.as_ref() {
            let proto_area = protocol.area();
            let draw_width = proto_area.width.min(inner.width);
            let draw_height = proto_area.height.min(inner.height);
            let draw_area = Rect::new(
                inner.x + inner.width.saturating_sub(draw_width) / 2,
                inner.y + inner.height.saturating_sub(draw_height) / 2,
                draw_width,
                draw_height,
            );
            frame.render_widget(ImageWidget::new(protocol), draw_area);
            return;
        }

        let label = self.placeholder.as_deref().unwrap_or("no cover");
        frame.render_widget(placeholder(label, inner), inner);
    }

    fn load(&mut self, picker: &Picker, image_path: Option<&str>, area: Rect) {
        self.protocol = None;
        self.placeholder = None;

        let Some(path) = image_path else {
            return;
        };
        if !Path::new(path).is_file() {
            self.placeholder = Some(format!("cover not found:\n{path}"));
            return;
        }

        let image = match image::open(path) {
            Ok(image) => image,
            Err(err) => {
                tracing::warn!(path, error = %err, "failed to decode cover image");
                self.placeholder = Some(format!("unreadable cover:\n{path}"));
                return;
            }
        };

        match picker.new_protocol(image, area, Resize::Fit(None)) {
            Ok(protocol) => self.protocol = Some(protocol),
            Err(err) => {
                tracing::warn!(path, error = %err, "failed to encode cover image");
                self.placeholder = Some("cover cannot be shown".to_string());
            }
        }
    }
}

fn placeholder(label: &str, area: Rect) -> Paragraph<'static> {
    let mut lines = Vec::new();
    let pad = area.height.saturating_sub(3) / 2;
    for _ in 0..pad {
        lines.push(Line::raw(""));
    }
    lines.push(Line::from(Span::styled(
        "[ no image ]",
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )));
    for part in label.lines() {
        lines.push(Line::from(Span::styled(
            part.to_string(),
            Style::default().fg(Color::DarkGray),
        )));
    }
    Paragraph::new(Text::from(lines))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
}
