//! Stateless rendering of the chess board.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::chess::{Piece, PieceKind, Side, Square};
use crate::controller::{BoardGeometry, BoardView};

/// Terminal columns per board cell.
pub const CELL_WIDTH: u16 = 6;
/// Terminal rows per board cell.
pub const CELL_HEIGHT: u16 = 3;

const BOARD_WIDTH: u16 = CELL_WIDTH * 8;
const BOARD_HEIGHT: u16 = CELL_HEIGHT * 8;

const LIGHT_SQUARE: Color = Color::Rgb(238, 238, 210);
const DARK_SQUARE: Color = Color::Rgb(118, 150, 86);
const SELECTED_SQUARE: Color = Color::Rgb(246, 246, 105);
const LAST_MOVE_SQUARE: Color = Color::Rgb(186, 202, 68);
const WHITE_PIECE: Color = Color::Rgb(255, 255, 255);
const BLACK_PIECE: Color = Color::Rgb(27, 30, 35);
const MESSAGE: Color = Color::Rgb(200, 50, 50);

/// Draws the whole screen and returns where the board landed.
pub fn draw(frame: &mut Frame, view: &BoardView, message: Option<&str>) -> Rect {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),                // Title
            Constraint::Min(BOARD_HEIGHT + 1),    // Board + file labels
            Constraint::Length(3),                // Status
        ])
        .split(area);

    let title = Paragraph::new("Chazz")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    let board = draw_board(frame, chunks[1], view);

    let help = "(click a piece, then its target; q quits)";
    let status = Paragraph::new(format!("{}   {}", view.status, help))
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, chunks[2]);

    if let Some(text) = message {
        draw_message(frame, board, text);
    }

    board
}

fn draw_board(frame: &mut Frame, area: Rect, view: &BoardView) -> Rect {
    // Two columns on the left for rank labels, one row below for file labels.
    let outer = center_rect(area, BOARD_WIDTH + 2, BOARD_HEIGHT + 1);
    let board = Rect::new(outer.x + 2, outer.y, BOARD_WIDTH, BOARD_HEIGHT);
    let geometry = BoardGeometry::new(u32::from(BOARD_WIDTH), u32::from(BOARD_HEIGHT), view.bottom);
    let screen = frame.area();

    for row in 0..8u16 {
        for col in 0..8u16 {
            let Some(square) = geometry.square_at(u32::from(col), u32::from(row)) else {
                continue;
            };
            let cell = Rect::new(
                board.x + col * CELL_WIDTH,
                board.y + row * CELL_HEIGHT,
                CELL_WIDTH,
                CELL_HEIGHT,
            )
            .intersection(screen);
            if cell.area() == 0 {
                continue;
            }
            draw_cell(frame, cell, view, square);
        }

        let label_y = board.y + row * CELL_HEIGHT + CELL_HEIGHT / 2;
        let label = Rect::new(outer.x, label_y, 1, 1).intersection(screen);
        if label.area() > 0 {
            let rank = match view.bottom {
                Side::White => 8 - row,
                Side::Black => row + 1,
            };
            frame.render_widget(
                Paragraph::new(rank.to_string()).style(Style::default().fg(Color::DarkGray)),
                label,
            );
        }
    }

    for col in 0..8u16 {
        let label = Rect::new(board.x + col * CELL_WIDTH, board.y + BOARD_HEIGHT, CELL_WIDTH, 1)
            .intersection(screen);
        if label.area() == 0 {
            continue;
        }
        let file = match view.bottom {
            Side::White => b'a' + col as u8,
            Side::Black => b'h' - col as u8,
        };
        frame.render_widget(
            Paragraph::new((file as char).to_string())
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            label,
        );
    }

    board
}

fn draw_cell(frame: &mut Frame, area: Rect, view: &BoardView, square: Square) {
    let is_light = (square.file() + square.rank()) % 2 == 1;
    let highlighted_by_last_move = view
        .last_move
        .is_some_and(|mv| mv.origin() == square || mv.destination() == square);

    let background = if view.selected == Some(square) {
        SELECTED_SQUARE
    } else if highlighted_by_last_move {
        LAST_MOVE_SQUARE
    } else if is_light {
        LIGHT_SQUARE
    } else {
        DARK_SQUARE
    };

    let style = match view.piece_at(square) {
        Some(piece) => Style::default()
            .bg(background)
            .fg(match piece.side {
                Side::White => WHITE_PIECE,
                Side::Black => BLACK_PIECE,
            })
            .add_modifier(Modifier::BOLD),
        None => Style::default().bg(background),
    };
    let glyph = view.piece_at(square).map(glyph).unwrap_or(' ');

    let mut lines = vec![Line::from(""); usize::from(CELL_HEIGHT / 2)];
    lines.push(Line::from(Span::styled(glyph.to_string(), style)));

    let paragraph = Paragraph::new(lines)
        .style(Style::default().bg(background))
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn draw_message(frame: &mut Frame, board: Rect, text: &str) {
    let width = (text.chars().count() as u16 + 4).min(frame.area().width);
    let popup = center_rect(board, width, 3).intersection(frame.area());
    if popup.area() == 0 {
        return;
    }
    frame.render_widget(Clear, popup);
    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(MESSAGE).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, popup);
}

/// Filled chess glyph; colour tells the sides apart.
fn glyph(piece: Piece) -> char {
    match piece.kind {
        PieceKind::King => '♚',
        PieceKind::Queen => '♛',
        PieceKind::Rook => '♜',
        PieceKind::Bishop => '♝',
        PieceKind::Knight => '♞',
        PieceKind::Pawn => '♟',
    }
}

/// Rectangle of `width` by `height` centred in `area`.
pub fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height.saturating_sub(height)) / 2),
            Constraint::Length(height),
            Constraint::Length((area.height.saturating_sub(height)) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((area.width.saturating_sub(width)) / 2),
            Constraint::Length(width),
            Constraint::Length((area.width.saturating_sub(width)) / 2),
        ])
        .split(vert[1])[1]
}
