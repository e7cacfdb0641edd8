//! Main application for the Gomoku GUI

use std::time::Instant;

use eframe::egui;
use egui::{CentralPanel, Context, CornerRadius, Frame, RichText, SidePanel, TopBottomPanel};

use super::board_view::BoardView;
use super::game_state::{GameOutcome, GameState};
use super::theme::*;
use crate::config::AppConfig;
use crate::{Difficulty, Stone, BOARD_SIZE};

/// Main Gomoku application
pub struct GomokuApp {
    state: GameState,
    board_view: BoardView,
    show_debug: bool,
}

impl GomokuApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: &AppConfig) -> Self {
        Self {
            state: GameState::new(config),
            board_view: BoardView::default(),
            show_debug: false,
        }
    }

    /// Render the top menu bar
    fn render_menu_bar(&mut self, ctx: &Context) {
        TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("Game", |ui| {
                    if ui.button("New Game").clicked() {
                        self.state.reset();
                        ui.close_menu();
                    }
                });

                ui.menu_button("Difficulty", |ui| {
                    for difficulty in Difficulty::ALL {
                        let selected = self.state.difficulty() == difficulty;
                        if ui.radio(selected, difficulty.label()).clicked() && !selected {
                            self.state.set_difficulty(difficulty);
                            ui.close_menu();
                        }
                    }
                });

                ui.menu_button("View", |ui| {
                    ui.checkbox(&mut self.show_debug, "AI Details (D)");
                });

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!("You: Black | AI: White ({})", self.state.difficulty()));
                });
            });
        });
    }

    /// Render the side panel with status, controls and AI details
    fn render_side_panel(&mut self, ctx: &Context) {
        SidePanel::right("info_panel")
            .min_width(220.0)
            .max_width(260.0)
            .frame(Frame::new().fill(egui::Color32::from_rgb(25, 27, 31)))
            .show(ctx, |ui| {
                ui.add_space(12.0);
                ui.horizontal(|ui| {
                    ui.add_space(8.0);
                    ui.label(RichText::new("GOMOKU").size(22.0).strong().color(TEXT_PRIMARY));
                });
                ui.add_space(12.0);

                self.render_status_card(ui);
                ui.add_space(10.0);

                self.render_controls_card(ui);

                if self.show_debug {
                    ui.add_space(10.0);
                    self.render_debug_card(ui);
                }

                if let Some(msg) = self.state.message.clone() {
                    ui.add_space(10.0);
                    Self::render_message_card(ui, &msg);
                }
            });
    }

    fn card_frame() -> Frame {
        Frame::new()
            .fill(egui::Color32::from_rgb(35, 38, 43))
            .corner_radius(CornerRadius::same(8))
            .inner_margin(12.0)
    }

    fn render_status_card(&self, ui: &mut egui::Ui) {
        Self::card_frame().show(ui, |ui| {
            ui.label(RichText::new("STATUS").size(10.0).color(TEXT_MUTED));
            ui.add_space(6.0);

            let color = match self.state.outcome {
                Some(GameOutcome::Win(stone)) if stone == self.state.human => STATUS_WIN,
                Some(GameOutcome::Win(_)) => STATUS_LOSS,
                Some(GameOutcome::Draw) => TEXT_SECONDARY,
                None if self.state.is_ai_turn() => STATUS_THINKING,
                None => TEXT_PRIMARY,
            };
            ui.label(RichText::new(self.state.status_text()).size(18.0).strong().color(color));

            if let Some(elapsed) = self.state.ai_thinking_elapsed() {
                ui.label(RichText::new(format!("{:.2}s", elapsed.as_secs_f32())).size(12.0).color(TEXT_SECONDARY));
            }

            ui.add_space(4.0);
            let turn = match self.state.current_turn {
                Stone::Black => "Black",
                _ => "White",
            };
            ui.label(
                RichText::new(format!("Move #{} | {} to play", self.state.board.stone_count() + 1, turn))
                    .size(11.0)
                    .color(TEXT_SECONDARY),
            );
        });
    }

    fn render_controls_card(&mut self, ui: &mut egui::Ui) {
        Self::card_frame().show(ui, |ui| {
            ui.label(RichText::new("DIFFICULTY").size(10.0).color(TEXT_MUTED));
            ui.add_space(6.0);

            let current = self.state.difficulty();
            let mut chosen = current;
            ui.horizontal(|ui| {
                for difficulty in Difficulty::ALL {
                    ui.selectable_value(&mut chosen, difficulty, difficulty.label());
                }
            });
            if chosen != current {
                self.state.set_difficulty(chosen);
            }

            ui.add_space(10.0);
            if ui.button(RichText::new("New Game (N)").size(13.0)).clicked() {
                self.state.reset();
            }
        });
    }

    fn render_debug_card(&self, ui: &mut egui::Ui) {
        Self::card_frame().show(ui, |ui| {
            ui.label(RichText::new("AI DETAILS").size(10.0).color(TEXT_MUTED));
            ui.add_space(6.0);

            let Some(result) = &self.state.last_ai_result else {
                ui.label(RichText::new("Waiting for AI...").size(10.0).color(TEXT_MUTED));
                return;
            };
            ui.label(RichText::new(format!("{:?}", result.search_type)).size(11.0).strong().color(STATUS_WIN));
            ui.label(RichText::new(format!("Score: {}", result.score)).size(10.0).color(TEXT_SECONDARY));
            ui.label(
                RichText::new(format!("{}ms, {} nodes", result.time_ms, result.nodes))
                    .size(10.0)
                    .color(TEXT_SECONDARY),
            );
            if let Some(pos) = result.best_move {
                let col = (b'A' + pos.col) as char;
                let row = BOARD_SIZE - pos.row as usize;
                ui.label(RichText::new(format!("-> {}{}", col, row)).size(12.0).strong().color(WIN_HIGHLIGHT));
            }
        });
    }

    fn render_message_card(ui: &mut egui::Ui, msg: &str) {
        Frame::new()
            .fill(egui::Color32::from_rgb(80, 60, 30))
            .corner_radius(CornerRadius::same(8))
            .inner_margin(10.0)
            .show(ui, |ui| {
                ui.label(RichText::new(msg).size(11.0).color(TEXT_PRIMARY));
            });
    }

    fn render_board(&mut self, ctx: &Context) {
        CentralPanel::default().show(ctx, |ui| {
            let accept_input = self.state.is_human_turn();
            let clicked = self
                .board_view
                .show(ui, &self.state.board, self.state.current_turn, accept_input);

            if let Some(pos) = clicked {
                if let Err(msg) = self.state.try_place_stone(pos) {
                    self.state.message = Some(msg);
                }
            }
        });
    }

    fn handle_input(&mut self, ctx: &Context) {
        let (toggle_debug, new_game) = ctx.input(|i| (i.key_pressed(egui::Key::D), i.key_pressed(egui::Key::N)));
        if toggle_debug {
            self.show_debug = !self.show_debug;
        }
        if new_game {
            self.state.reset();
        }
    }
}

impl eframe::App for GomokuApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.handle_input(ctx);
        self.state.update(Instant::now());

        self.render_menu_bar(ctx);
        self.render_side_panel(ctx);
        self.render_board(ctx);

        // Keep polling while the AI is pending
        if self.state.is_ai_turn() {
            ctx.request_repaint();
        }
    }
}
