use crate::app::App;
use crate::braille;
use pencilfloor::interaction::{Glyph, OverlayIcon};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const SIDEBAR_WIDTH: u16 = 24;

// UI color scheme
const BORDER_COLOR: Color = Color::Cyan;
const HIGHLIGHT_COLOR: Color = Color::Yellow;
const TEXT_COLOR: Color = Color::White;
const DIM_TEXT_COLOR: Color = Color::Gray;

/// Creates a standard styled block with rounded borders
fn styled_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_COLOR))
        .title(title)
}

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
        .split(area);

    render_sidebar(frame, layout[0], app);
    render_canvas(frame, layout[1], app);

    if app.show_help {
        render_help_overlay(frame, area);
    }
}

/// Calculate the canvas size (excluding borders)
pub fn get_canvas_size(frame_area: Rect) -> (u16, u16) {
    let canvas_width = frame_area.width.saturating_sub(SIDEBAR_WIDTH + 2);
    let canvas_height = frame_area.height.saturating_sub(2);
    (canvas_width, canvas_height)
}

fn render_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Status
            Constraint::Length(8), // Parameters
            Constraint::Min(9),    // Controls
        ])
        .split(area);

    render_status_box(frame, sections[0], app);
    render_params_box(frame, sections[1], app);
    render_controls_box(frame, sections[2]);
}

fn render_status_box(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block(" Pencilfloor ");
    let floor = app.floor();

    let status_text = app.status();
    let status_color = match status_text {
        "PAUSED" => HIGHLIGHT_COLOR,
        "WAITING" => DIM_TEXT_COLOR,
        _ => Color::Green,
    };

    let mut content = vec![
        Line::from(Span::styled(
            format!("Instant {}", floor.instant()),
            Style::default().fg(TEXT_COLOR),
        )),
        Line::from(vec![
            Span::styled(status_text, Style::default().fg(status_color)),
            Span::styled(
                format!("  +{}/frame", app.last_steps),
                Style::default().fg(DIM_TEXT_COLOR),
            ),
        ]),
    ];
    if let Some(message) = &app.message {
        content.push(Line::from(Span::styled(
            message.clone(),
            Style::default().fg(HIGHLIGHT_COLOR),
        )));
    }

    let paragraph = Paragraph::new(content).block(block);
    frame.render_widget(paragraph, area);
}

fn render_params_box(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block(" Parameters ");
    let floor = app.floor();

    let make_line = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{}: ", label), Style::default().fg(DIM_TEXT_COLOR)),
            Span::styled(value, Style::default().fg(TEXT_COLOR)),
        ])
    };

    let content = vec![
        make_line("Quickness", format!("{:.3}", floor.quickness())),
        make_line("Rate", format!("{:.2}", floor.instant_rate())),
        make_line("Pencils", format!("{}", floor.pencil_count())),
        make_line("Size", format!("{}x{}", floor.width(), floor.height())),
        make_line("Pencil", format!("{}", floor.pencil_size())),
        make_line("Hidden", format!("{}", app.hidden)),
    ];

    let paragraph = Paragraph::new(content).block(block);
    frame.render_widget(paragraph, area);
}

fn render_controls_box(frame: &mut Frame, area: Rect) {
    let key_style = Style::default().fg(HIGHLIGHT_COLOR);
    let desc_style = Style::default().fg(DIM_TEXT_COLOR);

    let make_control = |key: &str, desc: &str| -> Line<'static> {
        Line::from(vec![
            Span::styled(format!("{:>5}", key), key_style),
            Span::styled(format!(" {}", desc), desc_style),
        ])
    };

    let content = vec![
        make_control("Space", "play/pause"),
        make_control("+/-", "instant rate"),
        make_control("[/]", "quickness"),
        make_control("H", "hide/show"),
        make_control("R", "re-init"),
        make_control("S", "save config"),
        make_control("?", "help"),
        make_control("Q", "quit"),
    ];

    let paragraph = Paragraph::new(content).block(styled_block(" Controls "));
    frame.render_widget(paragraph, area);
}

fn render_canvas(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block("");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // A hidden widget renders nothing
    if app.hidden {
        return;
    }

    let cells = braille::render_to_braille(app.floor().canvas(), inner.width, inner.height);

    for cell in cells {
        let x = inner.x + cell.x;
        let y = inner.y + cell.y;

        if x < inner.x + inner.width && y < inner.y + inner.height {
            let cell_rect = Rect {
                x,
                y,
                width: 1,
                height: 1,
            };
            let span = Span::styled(cell.char.to_string(), Style::default().fg(cell.color));
            frame.render_widget(Paragraph::new(Line::from(span)), cell_rect);
        }
    }

    if let Some(icon) = app.floor().overlay_icon() {
        render_overlay_icon(frame, inner, app, icon);
    }
}

/// Centered play/pause badge, dimming as the icon fades
fn render_overlay_icon(frame: &mut Frame, inner: Rect, app: &App, icon: &OverlayIcon) {
    let now = app.now();
    if !icon.is_visible(now) || icon.size == 0 {
        return;
    }
    let opacity = icon.opacity(now);

    let (cells_width, cells_height) = braille::cells_for_pixels(icon.size, icon.size);
    let width = cells_width.max(3).min(inner.width);
    let height = cells_height.max(1).min(inner.height);
    let (used_width, used_height) =
        braille::cells_for_pixels(app.floor().width(), app.floor().height());
    let center_x = inner.x + used_width.min(inner.width) / 2;
    let center_y = inner.y + used_height.min(inner.height) / 2;
    let icon_area = Rect {
        x: center_x.saturating_sub(width / 2).max(inner.x),
        y: center_y.saturating_sub(height / 2).max(inner.y),
        width,
        height,
    };

    let level = (105.0 * opacity / pencilfloor::interaction::OVERLAY_OPACITY) as u8;
    let glyph = match icon.glyph {
        Glyph::Play => "▶",
        Glyph::Pause => "⏸",
    };
    let mut lines = vec![Line::from(""); (height / 2) as usize];
    lines.push(Line::from(Span::styled(
        glyph,
        Style::default().fg(Color::Rgb(255, 255, 255)),
    )));

    frame.render_widget(Clear, icon_area);
    let badge = Paragraph::new(lines)
        .alignment(ratatui::layout::Alignment::Center)
        .style(Style::default().bg(Color::Rgb(level, level, level)));
    frame.render_widget(badge, icon_area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let canvas_width = area.width.saturating_sub(SIDEBAR_WIDTH);

    let help_width = 56.min(canvas_width.saturating_sub(4));
    let help_height = area.height.saturating_sub(4).min(20);
    let x = SIDEBAR_WIDTH + (canvas_width.saturating_sub(help_width)) / 2;
    let y = (area.height.saturating_sub(help_height)) / 2;

    let help_area = Rect {
        x: area.x + x,
        y: area.y + y,
        width: help_width,
        height: help_height,
    };

    frame.render_widget(Clear, help_area);

    let content = vec![
        Line::from(""),
        Line::from(Span::styled("PENCILFLOOR", Style::default().fg(BORDER_COLOR))),
        Line::from(""),
        Line::from("Pencils attract each other and bounce off the edges, tracing their paths."),
        Line::from(""),
        Line::from(Span::styled("Quickness", Style::default().fg(TEXT_COLOR))),
        Line::from("Size of one simulation step. Changes the shape of the trails."),
        Line::from(""),
        Line::from(Span::styled("Instant rate", Style::default().fg(TEXT_COLOR))),
        Line::from("Steps per millisecond. Changes speed only."),
        Line::from(""),
        Line::from(Span::styled("Hide/show", Style::default().fg(TEXT_COLOR))),
        Line::from("A hidden pencilfloor stops stepping and resumes once shown again."),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(HIGHLIGHT_COLOR))
        .title(" Help (? to close) ");

    let paragraph = Paragraph::new(content).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, help_area);
}
