use std::time::Instant;

use eframe::egui::{self, Color32, ColorImage, TextureHandle, TextureOptions};

use crate::audio_engine::{tone_frequency, ToneController, ToneStatus, ToneSync};
use crate::auto_driver::AutoDriver;
use crate::particles::ParticleSystem;
use crate::render::{FrameSurface, RenderLoop};
use crate::types::{
    FieldMode, SimulationParams, UiFlags, AMPLITUDE_MAX, AMPLITUDE_MIN, FREQUENCY_MAX,
    FREQUENCY_MIN, PARTICLE_COUNT_MAX, PARTICLE_COUNT_MIN,
};

pub struct CymaticsApp {
    params: SimulationParams,
    flags: UiFlags,
    render: RenderLoop,
    surface: FrameSurface,
    texture: Option<TextureHandle>,
    auto: AutoDriver,
    tone: ToneController,
    tone_sync: ToneSync,
}

impl CymaticsApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        params: SimulationParams,
        flags: UiFlags,
        seed: Option<u64>,
    ) -> Self {
        Self::with_state(params, flags, seed)
    }

    /// Builds the app without a window; the audio device opens on first play.
    pub(crate) fn with_state(
        params: SimulationParams,
        flags: UiFlags,
        seed: Option<u64>,
    ) -> Self {
        let particles = match seed {
            Some(seed) => ParticleSystem::with_seed(params.particle_count, seed),
            None => ParticleSystem::new(params.particle_count),
        };

        Self {
            params,
            flags,
            render: RenderLoop::new(particles),
            surface: FrameSurface::new(0, 0),
            texture: None,
            auto: AutoDriver::new(flags.auto_mode),
            tone: ToneController::new(),
            tone_sync: ToneSync::default(),
        }
    }

    fn set_auto_mode(&mut self, enabled: bool) {
        self.flags.auto_mode = enabled;
        self.auto.set_enabled(enabled);
    }

    /// A manual frequency edit hands control back to the user.
    fn apply_frequency_edits(&mut self, edited: bool) {
        if edited && self.flags.auto_mode {
            self.set_auto_mode(false);
        }
    }

    fn drive_auto(&mut self) {
        if let Some((n, m)) = self.auto.tick(Instant::now()) {
            self.params.frequency_n = n;
            self.params.frequency_m = m;
        }
    }

    fn sync_audio(&mut self) {
        self.tone_sync
            .sync(&mut self.tone, &self.params, self.flags.audio_on);
    }

    fn update_texture(&mut self, ctx: &egui::Context) {
        let image =
            ColorImage::from_rgba_unmultiplied(self.surface.dimensions(), self.surface.pixels());

        if let Some(texture) = &mut self.texture {
            texture.set(image, TextureOptions::NEAREST);
        } else {
            self.texture = Some(ctx.load_texture("plate", image, TextureOptions::NEAREST));
        }
    }

    fn draw_controls(&mut self, ui: &mut egui::Ui) {
        ui.heading("Wave Controls");
        ui.label(
            "Adjust the standing wave parameters to see how constructive and \
             destructive interference forms geometry.",
        );
        ui.separator();

        ui.horizontal(|ui| {
            ui.selectable_value(
                &mut self.params.mode,
                FieldMode::Chladni,
                FieldMode::Chladni.label(),
            );
            ui.selectable_value(
                &mut self.params.mode,
                FieldMode::Interference,
                FieldMode::Interference.label(),
            );
        });

        ui.separator();
        ui.horizontal(|ui| {
            ui.label("Frequencies");
            let label = if self.flags.auto_mode {
                "AUTO ON"
            } else {
                "AUTO OFF"
            };
            if ui.selectable_label(self.flags.auto_mode, label).clicked() {
                let enabled = !self.flags.auto_mode;
                self.set_auto_mode(enabled);
            }
        });

        // Edits-only clamping: a swept value off the step grid is left alone
        // until the user actually drags.
        let n_changed = ui
            .add(
                egui::Slider::new(&mut self.params.frequency_n, FREQUENCY_MIN..=FREQUENCY_MAX)
                    .step_by(0.01)
                    .clamping(egui::SliderClamping::Edits)
                    .text("frequency N"),
            )
            .changed();
        let m_changed = ui
            .add(
                egui::Slider::new(&mut self.params.frequency_m, FREQUENCY_MIN..=FREQUENCY_MAX)
                    .step_by(0.01)
                    .clamping(egui::SliderClamping::Edits)
                    .text("frequency M"),
            )
            .changed();
        self.apply_frequency_edits(n_changed || m_changed);

        ui.separator();
        ui.add(
            egui::Slider::new(&mut self.params.amplitude, AMPLITUDE_MIN..=AMPLITUDE_MAX)
                .step_by(1.0)
                .clamping(egui::SliderClamping::Edits)
                .text("amplitude %"),
        );
        ui.add(
            egui::Slider::new(
                &mut self.params.particle_count,
                PARTICLE_COUNT_MIN..=PARTICLE_COUNT_MAX,
            )
            .step_by(1_000.0)
            .clamping(egui::SliderClamping::Edits)
            .text("particles"),
        );

        ui.separator();
        ui.horizontal(|ui| {
            let force = if self.flags.show_field {
                "Hide Force"
            } else {
                "See Force"
            };
            if ui.button(force).clicked() {
                self.flags.show_field = !self.flags.show_field;
            }

            let sound = if self.flags.audio_on {
                "Sound On"
            } else {
                "Mute"
            };
            if ui.button(sound).clicked() {
                self.flags.audio_on = !self.flags.audio_on;
                self.tone.resume();
            }
        });

        ui.separator();
        ui.label(format!(
            "{} n={:.2} m={:.2}",
            self.params.mode.label(),
            self.params.frequency_n,
            self.params.frequency_m
        ));
        ui.label(format!(
            "tone: {:.0} Hz",
            tone_frequency(self.params.frequency_m, self.params.frequency_n)
        ));
        ui.label(format!(
            "grains: {}  respawned: {}",
            self.render.particles().len(),
            self.render.last_stats().respawned
        ));
        if self.flags.show_field {
            ui.label(format!(
                "nodal cells: {:.0}%",
                self.render.overlay().node_fraction() * 100.0
            ));
        }

        match self.tone.status() {
            ToneStatus::Unavailable => {
                ui.colored_label(Color32::from_rgb(230, 100, 100), "Audio offline");
            }
            _ => {
                if let Some(engine) = self.tone.sink() {
                    ui.label(format!(
                        "Audio device: {} ({} Hz)",
                        engine.device_name, engine.sample_rate
                    ));
                }
            }
        }
    }

    fn draw_plate(&mut self, ui: &mut egui::Ui) {
        let available = ui.available_size();
        let ppp = ui.ctx().pixels_per_point();
        let width = (available.x * ppp).max(0.0) as usize;
        let height = (available.y * ppp).max(0.0) as usize;
        if self.surface.resize(width, height) {
            log::debug!("plate surface resized to {width}x{height}");
        }

        if !self
            .render
            .frame(&mut self.surface, &self.params, self.flags.show_field)
        {
            return;
        }
        self.update_texture(ui.ctx());

        if let Some(texture) = &self.texture {
            let response = ui.image((texture.id(), available));
            ui.painter().text(
                response.rect.left_top() + egui::vec2(16.0, 16.0),
                egui::Align2::LEFT_TOP,
                "CYMATICS",
                egui::FontId::proportional(36.0),
                Color32::from_white_alpha(77),
            );
        }
    }
}

impl eframe::App for CymaticsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drive_auto();

        egui::SidePanel::right("controls")
            .resizable(true)
            .default_width(290.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        self.draw_controls(ui);
                    });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_plate(ui);
        });

        self.sync_audio();
        ctx.request_repaint();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw_controls_frame(app: &mut CymaticsApp, ctx: &egui::Context) {
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| app.draw_controls(ui));
        });
    }

    #[test]
    fn test_sweep_keeps_auto_on_across_frames() {
        let mut app =
            CymaticsApp::with_state(SimulationParams::default(), UiFlags::default(), Some(7));
        let ctx = egui::Context::default();

        for _ in 0..10 {
            let (n, m) = app.auto.advance(0.016).expect("auto starts enabled");
            app.params.frequency_n = n;
            app.params.frequency_m = m;
            draw_controls_frame(&mut app, &ctx);

            assert!(app.flags.auto_mode);
            assert!(app.auto.is_enabled());
            assert_eq!(app.params.frequency_n, n);
            assert_eq!(app.params.frequency_m, m);
        }
    }

    #[test]
    fn test_manual_frequency_edit_turns_auto_off() {
        let mut app =
            CymaticsApp::with_state(SimulationParams::default(), UiFlags::default(), Some(7));

        app.apply_frequency_edits(false);
        assert!(app.flags.auto_mode);

        app.params.frequency_n = 4.0;
        app.apply_frequency_edits(true);
        assert!(!app.flags.auto_mode);
        assert!(!app.auto.is_enabled());
        assert_eq!(app.auto.advance(0.5), None);

        draw_controls_frame(&mut app, &egui::Context::default());
        assert_eq!(app.params.frequency_n, 4.0);
        assert!(!app.flags.auto_mode);
    }

    #[test]
    fn test_off_grid_startup_values_survive_redraw() {
        let params = SimulationParams {
            frequency_n: 3.456,
            frequency_m: 7.891,
            amplitude: 33.3,
            particle_count: 1_500,
            ..Default::default()
        };
        let flags = UiFlags {
            auto_mode: false,
            ..Default::default()
        };
        let mut app = CymaticsApp::with_state(params, flags, Some(7));
        let ctx = egui::Context::default();

        for _ in 0..5 {
            draw_controls_frame(&mut app, &ctx);
        }
        assert_eq!(app.params, params);
        assert_eq!(app.flags, flags);
    }

    #[test]
    fn test_node_readout_follows_rendered_overlay() {
        let params = SimulationParams {
            frequency_n: 2.0,
            frequency_m: 5.0,
            particle_count: 1_000,
            ..Default::default()
        };
        let flags = UiFlags {
            show_field: true,
            auto_mode: false,
            ..Default::default()
        };
        let mut app = CymaticsApp::with_state(params, flags, Some(3));
        assert_eq!(app.render.overlay().node_fraction(), 0.0);

        app.surface.resize(64, 64);
        assert!(app
            .render
            .frame(&mut app.surface, &app.params, app.flags.show_field));
        let fraction = app.render.overlay().node_fraction();
        assert!(fraction > 0.0 && fraction < 1.0);

        draw_controls_frame(&mut app, &egui::Context::default());
        assert_eq!(app.render.overlay().node_fraction(), fraction);
    }
}
