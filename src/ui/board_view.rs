//! Board rendering for the Gomoku GUI

use crate::{Board, Pos, Stone, BOARD_SIZE};
use egui::{Color32, CornerRadius, Painter, Pos2, Rect, Sense, Stroke, Vec2};

use super::theme::*;

/// Board view handles rendering and input for the game board
pub struct BoardView {
    /// Cached cell size for coordinate calculations
    cell_size: f32,
    /// Board drawing area
    board_rect: Rect,
}

impl Default for BoardView {
    fn default() -> Self {
        Self {
            cell_size: 30.0,
            board_rect: Rect::NOTHING,
        }
    }
}

impl BoardView {
    /// Render the board and return the clicked cell, if any.
    ///
    /// Clicks are only reported on empty cells while `accept_input` is set.
    pub fn show(&mut self, ui: &mut egui::Ui, board: &Board, turn: Stone, accept_input: bool) -> Option<Pos> {
        let available_size = ui.available_size();

        let board_size = available_size.x.min(available_size.y) - 20.0;
        self.cell_size = (board_size - 2.0 * BOARD_MARGIN) / (BOARD_SIZE as f32 - 1.0);

        let (response, painter) = ui.allocate_painter(Vec2::new(board_size, board_size), Sense::click());
        self.board_rect = response.rect;

        painter.rect_filled(self.board_rect, CornerRadius::same(4), BOARD_BG);

        self.draw_grid(&painter);
        self.draw_star_points(&painter);
        self.draw_coordinates(&painter);
        self.draw_stones(&painter, board);

        if let Some(last) = board.last_move() {
            self.draw_last_move_marker(&painter, last.pos);
        }
        if !board.win_line().is_empty() {
            self.draw_winning_line(&painter, board.win_line());
        }

        if !accept_input {
            return None;
        }

        let pointer_pos = response.hover_pos()?;
        let board_pos = self.screen_to_board(pointer_pos)?;
        let is_valid = board.is_empty_at(board_pos);
        let color = if is_valid { hover_valid(turn) } else { hover_invalid() };
        self.draw_hover_preview(&painter, board_pos, color);

        (response.clicked() && is_valid).then_some(board_pos)
    }

    /// Draw the 15x15 grid lines
    fn draw_grid(&self, painter: &Painter) {
        let stroke = Stroke::new(GRID_LINE_WIDTH, GRID_LINE);
        let span = (BOARD_SIZE as f32 - 1.0) * self.cell_size;

        for i in 0..BOARD_SIZE {
            let offset = BOARD_MARGIN + i as f32 * self.cell_size;

            // Vertical line
            let start = self.board_rect.min + Vec2::new(offset, BOARD_MARGIN);
            let end = self.board_rect.min + Vec2::new(offset, BOARD_MARGIN + span);
            painter.line_segment([start, end], stroke);

            // Horizontal line
            let start = self.board_rect.min + Vec2::new(BOARD_MARGIN, offset);
            let end = self.board_rect.min + Vec2::new(BOARD_MARGIN + span, offset);
            painter.line_segment([start, end], stroke);
        }
    }

    fn draw_star_points(&self, painter: &Painter) {
        for (row, col) in STAR_POINTS {
            let center = self.board_to_screen(Pos::new(row, col));
            painter.circle_filled(center, STAR_POINT_RADIUS, STAR_POINT);
        }
    }

    /// Draw coordinate labels (A-O, 15-1)
    fn draw_coordinates(&self, painter: &Painter) {
        let font = egui::FontId::proportional(11.0);

        for col in 0..BOARD_SIZE {
            let letter = (b'A' + col as u8) as char;
            let x = self.board_rect.min.x + BOARD_MARGIN + col as f32 * self.cell_size;
            let pos = Pos2::new(x, self.board_rect.min.y + 10.0);
            painter.text(pos, egui::Align2::CENTER_CENTER, letter, font.clone(), GRID_LINE);
        }

        for row in 0..BOARD_SIZE {
            let num = BOARD_SIZE - row;
            let y = self.board_rect.min.y + BOARD_MARGIN + row as f32 * self.cell_size;
            let pos = Pos2::new(self.board_rect.min.x + 10.0, y);
            painter.text(pos, egui::Align2::CENTER_CENTER, num.to_string(), font.clone(), GRID_LINE);
        }
    }

    fn draw_stones(&self, painter: &Painter, board: &Board) {
        for stone in [Stone::Black, Stone::White] {
            for pos in board.stones(stone).iter_ones() {
                self.draw_stone(painter, pos, stone);
            }
        }
    }

    /// Draw a single stone with shadow and highlight
    fn draw_stone(&self, painter: &Painter, pos: Pos, stone: Stone) {
        let center = self.board_to_screen(pos);
        let radius = self.cell_size * STONE_RADIUS_RATIO;
        let shadow_offset = Vec2::new(2.0, 2.0);

        match stone {
            Stone::Black => {
                painter.circle_filled(center + shadow_offset, radius, Color32::from_rgba_unmultiplied(0, 0, 0, 60));
                painter.circle_filled(center, radius, BLACK_STONE);
                let highlight_offset = Vec2::new(-radius * 0.3, -radius * 0.3);
                painter.circle_filled(center + highlight_offset, radius * 0.2, BLACK_STONE_HIGHLIGHT);
            }
            Stone::White => {
                painter.circle_filled(center + shadow_offset, radius, Color32::from_rgba_unmultiplied(0, 0, 0, 40));
                painter.circle_filled(center, radius, WHITE_STONE);
                painter.circle_stroke(center, radius * 0.85, Stroke::new(radius * 0.1, WHITE_STONE_SHADOW));
            }
            Stone::Empty => {}
        }
    }

    fn draw_last_move_marker(&self, painter: &Painter, pos: Pos) {
        let center = self.board_to_screen(pos);
        painter.circle_filled(center, LAST_MOVE_MARKER_RADIUS, LAST_MOVE_MARKER);
    }

    /// Connect the winning run and ring each of its stones
    fn draw_winning_line(&self, painter: &Painter, line: &[Pos]) {
        let stroke = Stroke::new(4.0, WIN_HIGHLIGHT);

        for pair in line.windows(2) {
            let start = self.board_to_screen(pair[0]);
            let end = self.board_to_screen(pair[1]);
            painter.line_segment([start, end], stroke);
        }

        let radius = self.cell_size * STONE_RADIUS_RATIO + 3.0;
        for &pos in line {
            painter.circle_stroke(self.board_to_screen(pos), radius, stroke);
        }
    }

    fn draw_hover_preview(&self, painter: &Painter, pos: Pos, color: Color32) {
        let center = self.board_to_screen(pos);
        painter.circle_filled(center, self.cell_size * STONE_RADIUS_RATIO, color);
    }

    /// Convert screen coordinates to the nearest intersection
    pub fn screen_to_board(&self, screen_pos: Pos2) -> Option<Pos> {
        let relative = screen_pos - self.board_rect.min;
        let x = (relative.x - BOARD_MARGIN + self.cell_size * 0.5) / self.cell_size;
        let y = (relative.y - BOARD_MARGIN + self.cell_size * 0.5) / self.cell_size;
        Pos::try_new(y.floor() as i32, x.floor() as i32)
    }

    /// Convert board position to screen coordinates
    pub fn board_to_screen(&self, pos: Pos) -> Pos2 {
        let x = self.board_rect.min.x + BOARD_MARGIN + pos.col as f32 * self.cell_size;
        let y = self.board_rect.min.y + BOARD_MARGIN + pos.row as f32 * self.cell_size;
        Pos2::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> BoardView {
        BoardView {
            cell_size: 20.0,
            board_rect: Rect::from_min_size(Pos2::new(100.0, 50.0), Vec2::splat(340.0)),
        }
    }

    #[test]
    fn test_screen_board_round_trip_at_intersections() {
        let view = view();
        for pos in [Pos::new(0, 0), Pos::new(7, 7), Pos::new(14, 14), Pos::new(3, 11)] {
            assert_eq!(view.screen_to_board(view.board_to_screen(pos)), Some(pos));
        }
    }

    #[test]
    fn test_screen_to_board_snaps_to_nearest() {
        let view = view();
        let near = view.board_to_screen(Pos::new(5, 6)) + Vec2::new(9.0, -9.0);
        assert_eq!(view.screen_to_board(near), Some(Pos::new(5, 6)));
    }

    #[test]
    fn test_screen_to_board_outside_grid() {
        let view = view();
        assert_eq!(view.screen_to_board(Pos2::new(100.0, 50.0)), None);
        let past = view.board_to_screen(Pos::new(14, 14)) + Vec2::new(15.0, 0.0);
        assert_eq!(view.screen_to_board(past), None);
    }
}
