// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use taskpane_app::{AppMode, EditColumn, Pane, Stats, Task, ViewModel};

const ID_WIDTH: u16 = 4;
const SPOC_WIDTH: u16 = 15;
const STATE_WIDTH: u16 = 11;
const CONTENT_RESERVED: u16 = 35;
const COLUMN_GAP: u16 = 1;
const STATS_ROWS: u16 = 6;
const LIST_TOP: u16 = 2;
const ELLIPSIS: &str = "...";

pub const FOOTER_TEXT: &str = "j/k ↑/↓: move | h/l ←/→ Tab: switch pane | i: edit | Tab: edit column | Enter: save | Esc: cancel | q: quit";

const HEADERS: [&str; 4] = ["ID", "Content", "SPOC", "State"];

/// Render into a fresh `width` x `height` grid.
pub fn render_grid(view: &ViewModel, width: u16, height: u16) -> Buffer {
    let mut buf = Buffer::empty(Rect::new(0, 0, width, height));
    let area = buf.area;
    render_view(view, area, &mut buf);
    buf
}

pub fn render(frame: &mut ratatui::Frame<'_>, view: &ViewModel) {
    let area = frame.area();
    render_view(view, area, frame.buffer_mut());
}

/// Draws the whole screen into `buf`. Pure: the output depends only on
/// `view` and `area`.
pub fn render_view(view: &ViewModel, area: Rect, buf: &mut Buffer) {
    let area = area.intersection(buf.area);
    if area.is_empty() {
        return;
    }

    let body_bottom = area.height.saturating_sub(1);
    let half = area.width / 2;

    for y in 0..body_bottom {
        put_char(buf, area, half, y, '│', Style::default());
    }

    // The left pane keeps its last body row for the status line.
    let left = PaneArea {
        pane: Pane::Active,
        x: 1,
        width: half.saturating_sub(2),
        bottom: body_bottom.saturating_sub(1),
    };
    let right = PaneArea {
        pane: Pane::Closed,
        x: half.saturating_add(2),
        width: area.width.saturating_sub(half.saturating_add(3)),
        bottom: body_bottom.saturating_sub(STATS_ROWS),
    };
    render_pane(view, area, buf, left);
    render_pane(view, area, buf, right);

    render_stats(
        &view.snapshot.stats,
        area,
        buf,
        half.saturating_add(1),
        right.bottom,
        body_bottom,
    );

    if let Some(status) = view.status_line.as_deref().filter(|text| !text.is_empty()) {
        put_text(
            buf,
            area,
            left.x,
            left.bottom,
            left.width,
            status,
            Style::default().fg(Color::Yellow),
        );
    }

    put_text(
        buf,
        area,
        1,
        body_bottom,
        area.width.saturating_sub(1),
        FOOTER_TEXT,
        Style::default().fg(Color::Gray),
    );
}

#[derive(Debug, Clone, Copy)]
struct PaneArea {
    pane: Pane,
    x: u16,
    width: u16,
    /// Exclusive.
    bottom: u16,
}

fn render_pane(view: &ViewModel, area: Rect, buf: &mut Buffer, pane_area: PaneArea) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    put_text(
        buf,
        area,
        pane_area.x,
        0,
        pane_area.width,
        pane_area.pane.title(),
        bold,
    );

    let widths = column_widths(pane_area.width);
    let offsets = column_offsets(pane_area.x, &widths);
    if pane_area.bottom > 1 {
        for ((header, x), width) in HEADERS.iter().zip(offsets).zip(widths) {
            put_text(buf, area, x, 1, width, header, bold);
        }
    }

    let focused = view.pane == pane_area.pane;
    let visible_rows = usize::from(pane_area.bottom.saturating_sub(LIST_TOP));
    if visible_rows == 0 {
        return;
    }
    let first_row = if focused {
        scroll_offset(view.cursor, visible_rows)
    } else {
        0
    };
    let edit_cell = edit_cell_for(view, pane_area.pane);

    let tasks = view.list(pane_area.pane);
    for (index, task) in tasks.iter().enumerate().skip(first_row).take(visible_rows) {
        let Ok(screen_row) = u16::try_from(index - first_row) else {
            break;
        };
        let y = LIST_TOP + screen_row;
        let selected = focused && index == view.cursor;
        let row_style = if selected {
            Style::default().bg(Color::DarkGray)
        } else {
            Style::default()
        };
        if selected {
            fill_row(buf, area, pane_area.x, y, pane_area.width, row_style);
        }

        for (column, value) in row_values(task).iter().enumerate() {
            let width = widths[column];
            let x = offsets[column];
            match edit_cell {
                Some((row, edit_column)) if row == index && edit_column == column => {
                    put_text(
                        buf,
                        area,
                        x,
                        y,
                        width,
                        &tail_to_width(&view.edit_buffer, usize::from(width)),
                        Style::default().fg(Color::Black).bg(Color::Yellow),
                    );
                }
                _ => put_text(
                    buf,
                    area,
                    x,
                    y,
                    width,
                    &fit_to_width(value, usize::from(width)),
                    row_style,
                ),
            }
        }
    }
}

fn render_stats(stats: &Stats, area: Rect, buf: &mut Buffer, x: u16, rule_y: u16, bottom: u16) {
    if rule_y >= bottom {
        return;
    }
    let width = area.width.saturating_sub(x);
    for column in x..area.width {
        put_char(buf, area, column, rule_y, '─', Style::default());
    }
    put_text(
        buf,
        area,
        x.saturating_add(1),
        rule_y,
        width.saturating_sub(1),
        " Statistics ",
        Style::default().add_modifier(Modifier::BOLD),
    );

    for (offset, line) in stats_lines(stats).iter().enumerate() {
        let Ok(offset) = u16::try_from(offset) else {
            break;
        };
        let y = rule_y + 1 + offset;
        if y >= bottom {
            break;
        }
        put_text(
            buf,
            area,
            x.saturating_add(1),
            y,
            width.saturating_sub(1),
            line,
            Style::default(),
        );
    }
}

pub fn stats_lines(stats: &Stats) -> [String; 5] {
    let avg = if stats.avg_completion_days.is_finite() {
        stats.avg_completion_days
    } else {
        0.0
    };
    [
        format!("Open: {}", stats.open),
        format!("In Progress: {}", stats.in_progress),
        format!("Closed: {}", stats.closed),
        format!("Cancelled: {}", stats.cancelled),
        format!("Avg Completion Time: {avg:.1} days"),
    ]
}

fn row_values(task: &Task) -> [String; 4] {
    [
        task.id.to_string(),
        task.content.clone(),
        task.spoc.clone().unwrap_or_default(),
        task.state.as_str().to_owned(),
    ]
}

fn edit_cell_for(view: &ViewModel, pane: Pane) -> Option<(usize, usize)> {
    let AppMode::Edit(column) = view.mode else {
        return None;
    };
    let target = view.edit_target?;
    if target.pane != pane {
        return None;
    }
    let column_index = match column {
        EditColumn::Content => 1,
        EditColumn::State => 3,
    };
    Some((target.row, column_index))
}

fn column_widths(pane_width: u16) -> [u16; 4] {
    [
        ID_WIDTH,
        pane_width.saturating_sub(CONTENT_RESERVED),
        SPOC_WIDTH,
        STATE_WIDTH,
    ]
}

fn column_offsets(x: u16, widths: &[u16; 4]) -> [u16; 4] {
    let mut offsets = [x; 4];
    for index in 1..offsets.len() {
        offsets[index] = offsets[index - 1]
            .saturating_add(widths[index - 1])
            .saturating_add(COLUMN_GAP);
    }
    offsets
}

fn scroll_offset(cursor: usize, visible_rows: usize) -> usize {
    if visible_rows == 0 {
        return 0;
    }
    (cursor + 1).saturating_sub(visible_rows)
}

/// Values wider than the column keep `width - 3` characters plus `...`.
pub fn fit_to_width(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_owned();
    }
    if width < ELLIPSIS.len() {
        return value.chars().take(width).collect();
    }
    let mut fitted: String = value.chars().take(width - ELLIPSIS.len()).collect();
    fitted.push_str(ELLIPSIS);
    fitted
}

/// While typing, the end of the buffer is what matters.
fn tail_to_width(value: &str, width: usize) -> String {
    let count = value.chars().count();
    value.chars().skip(count.saturating_sub(width)).collect()
}

fn put_text(
    buf: &mut Buffer,
    area: Rect,
    x: u16,
    y: u16,
    max_width: u16,
    text: &str,
    style: Style,
) {
    if max_width == 0 || x >= area.width || y >= area.height {
        return;
    }
    buf.set_stringn(
        area.x + x,
        area.y + y,
        text,
        usize::from(max_width),
        style,
    );
}

fn put_char(buf: &mut Buffer, area: Rect, x: u16, y: u16, ch: char, style: Style) {
    if x >= area.width || y >= area.height {
        return;
    }
    if let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) {
        cell.set_char(ch).set_style(style);
    }
}

fn fill_row(buf: &mut Buffer, area: Rect, x: u16, y: u16, width: u16, style: Style) {
    if x >= area.width || y >= area.height {
        return;
    }
    let width = width.min(area.width - x);
    buf.set_style(Rect::new(area.x + x, area.y + y, width, 1), style);
}
