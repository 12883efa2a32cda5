//! Application main loop

use crate::platform::RfdPicker;
use anyhow::Result;
use app_core::{
    help_text_for, platform_identifier, Action, AppConfig, Command, EffectRunner, FileSettingsStore,
    ImageLoader, Keymap, PlatformRequest, SettingsStore, ViewerState, WindowBounds,
};
use app_ui::{Gallery, GalleryAction, HelpView, InputHandler, Renderer};
use crossbeam_channel::{unbounded, Receiver};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalPosition, PhysicalSize},
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy},
    window::{Window, WindowId},
};

const TITLE: &str = "Minimal Image Viewer";

/// Wakes the event loop from worker threads
#[derive(Debug, Clone, Copy)]
enum UserEvent {
    Wake,
}

/// Main application state for the event loop
struct App {
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    egui_ctx: egui::Context,
    egui_state: Option<egui_winit::State>,

    input: InputHandler,
    settings: Arc<dyn SettingsStore>,
    initial_bounds: Option<WindowBounds>,
    help: String,

    state: ViewerState,
    runner: EffectRunner,
    actions: Receiver<Action>,
    loader: ImageLoader,
    gallery: Gallery,

    inspector_open: bool,
    started: bool,
    next_repaint: Option<Instant>,
}

impl App {
    fn new(proxy: EventLoopProxy<UserEvent>, runtime: Handle) -> Result<Self> {
        let settings: Arc<dyn SettingsStore> = Arc::new(FileSettingsStore::default_location());
        let config: AppConfig = settings.load();

        // EventLoopProxy is not Sync on every platform
        let proxy = Mutex::new(proxy);
        let notify: Arc<dyn Fn() + Send + Sync> = Arc::new(move || {
            if proxy.lock().send_event(UserEvent::Wake).is_err() {
                tracing::trace!("Event loop closed, dropping wake-up");
            }
        });

        let (action_tx, actions) = unbounded();
        let runner = EffectRunner::new(
            runtime,
            Box::new(RfdPicker),
            Arc::clone(&settings),
            action_tx,
            Arc::clone(&notify),
        )
        .with_picker_mode(config.picker.mode);

        let loader = ImageLoader::new(notify)?;
        let keymap = Keymap::from_bindings(&config.keybindings);
        tracing::debug!("{} keys bound", keymap.len());

        Ok(Self {
            window: None,
            renderer: None,
            egui_ctx: egui::Context::default(),
            egui_state: None,

            input: InputHandler::new(keymap),
            settings,
            initial_bounds: config.window,
            help: help_text_for(platform_identifier(), &config.keybindings, config.picker.mode),

            state: ViewerState::new(config.viewer),
            runner,
            actions,
            loader,
            gallery: Gallery::new(),

            inspector_open: false,
            started: false,
            next_repaint: None,
        })
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let mut window_attrs = Window::default_attributes().with_title(TITLE);
        window_attrs = match self.initial_bounds {
            Some(b) => window_attrs
                .with_inner_size(PhysicalSize::new(b.width, b.height))
                .with_position(PhysicalPosition::new(b.x, b.y)),
            None => window_attrs.with_inner_size(PhysicalSize::new(
                WindowBounds::DEFAULT_WIDTH,
                WindowBounds::DEFAULT_HEIGHT,
            )),
        };

        let window = Arc::new(event_loop.create_window(window_attrs)?);

        // Initialize renderer
        let renderer = pollster::block_on(Renderer::new(window.clone()))?;

        // Initialize egui
        let egui_state = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            Some(renderer.device.limits().max_texture_dimension_2d as usize),
        );

        self.window = Some(window);
        self.renderer = Some(renderer);
        self.egui_state = Some(egui_state);

        Ok(())
    }

    /// Feed one action through the reducer and act on what it asks for
    fn dispatch(&mut self, action: Action, event_loop: &ActiveEventLoop) {
        let (next, requests) = self.runner.dispatch(&self.state, action);

        if !Arc::ptr_eq(&self.state.files, &next.files) {
            self.gallery.clear();
        }
        self.state = next;

        for request in requests {
            match request {
                PlatformRequest::Quit => {
                    self.quit(event_loop);
                    return;
                }
                PlatformRequest::ToggleDevTools => self.inspector_open = !self.inspector_open,
            }
        }

        for path in self.gallery.sync(&self.state.windows()) {
            self.loader.request(&path);
        }
        self.loader.retain(self.state.windows().iter());

        self.update_title();
        self.request_redraw();
    }

    /// Pull in results from the workers
    fn drain_workers(&mut self, event_loop: &ActiveEventLoop) {
        while let Ok(action) = self.actions.try_recv() {
            self.dispatch(action, event_loop);
        }

        let loaded = self.loader.drain();
        if !loaded.is_empty() {
            for result in loaded {
                self.gallery.accept(&self.egui_ctx, result);
            }
            self.request_redraw();
        }
    }

    fn update_title(&self) {
        let Some(window) = &self.window else { return };
        let label = self.state.position_label();
        if label.is_empty() || self.state.shows_help() {
            window.set_title(TITLE);
        } else {
            window.set_title(&format!("{} - {}", TITLE, label));
        }
    }

    fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn save_window_bounds(&self) {
        let Some(window) = &self.window else { return };
        let position = match window.outer_position() {
            Ok(p) => p,
            Err(e) => {
                tracing::debug!("Window position unavailable: {}", e);
                return;
            }
        };
        let size = window.inner_size();
        let bounds = WindowBounds {
            x: position.x,
            y: position.y,
            width: size.width,
            height: size.height,
        };

        if let Err(e) = self.settings.update(&|config| config.window = Some(bounds)) {
            tracing::warn!("Failed to save window bounds: {}", e);
        }
    }

    fn quit(&mut self, event_loop: &ActiveEventLoop) {
        tracing::info!("Quitting");
        self.save_window_bounds();
        event_loop.exit();
    }

    fn render(&mut self) {
        let Some(window) = self.window.clone() else { return };
        let Some(egui_state) = &mut self.egui_state else { return };

        let raw_input = egui_state.take_egui_input(&window);

        let state = &self.state;
        let gallery = &self.gallery;
        let help = &self.help;
        let mut inspector_open = self.inspector_open;

        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                if state.shows_help() {
                    HelpView::ui(ui, help);
                } else if let Some(GalleryAction::CopyText(text)) = gallery.ui(ui, state) {
                    tracing::debug!("Copying {} bytes to the clipboard", text.len());
                    ctx.copy_text(text);
                }
            });

            if inspector_open {
                egui::Window::new("Inspector")
                    .open(&mut inspector_open)
                    .vscroll(true)
                    .show(ctx, |ui| ctx.inspection_ui(ui));
            }
        });
        self.inspector_open = inspector_open;

        egui_state.handle_platform_output(&window, full_output.platform_output);

        let repaint_delay = full_output
            .viewport_output
            .get(&egui::ViewportId::ROOT)
            .map(|v| v.repaint_delay)
            .unwrap_or(Duration::MAX);
        self.next_repaint = if repaint_delay.is_zero() {
            window.request_redraw();
            None
        } else {
            Instant::now().checked_add(repaint_delay)
        };

        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        if let Some(renderer) = &mut self.renderer {
            renderer.paint(&full_output.textures_delta, &primitives, full_output.pixels_per_point);
        }
    }
}

impl ApplicationHandler<UserEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init_window(event_loop) {
                tracing::error!("Failed to initialize window: {}", e);
                event_loop.exit();
                return;
            }
        }

        if !self.started {
            self.started = true;
            self.dispatch(Command::Open.into(), event_loop);
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: UserEvent) {
        match event {
            UserEvent::Wake => self.drain_workers(event_loop),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Let egui handle the event first
        if let (Some(egui_state), Some(window)) = (&mut self.egui_state, &self.window) {
            let response = egui_state.on_window_event(window, &event);
            if response.repaint {
                window.request_redraw();
            }
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Close requested");
                self.quit(event_loop);
            }

            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize((size.width, size.height));
                }
                self.request_redraw();
            }

            WindowEvent::ModifiersChanged(modifiers) => {
                self.input.update_modifiers(modifiers.state());
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(command) = self.input.handle_key(&event) {
                    self.dispatch(command.into(), event_loop);
                }
            }

            WindowEvent::RedrawRequested => {
                self.render();
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        match self.next_repaint {
            Some(at) if at <= Instant::now() => {
                self.next_repaint = None;
                self.request_redraw();
                event_loop.set_control_flow(ControlFlow::Wait);
            }
            Some(at) => event_loop.set_control_flow(ControlFlow::WaitUntil(at)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }
}

/// Run the application
pub fn run(runtime: Handle) -> Result<()> {
    let event_loop = EventLoop::<UserEvent>::with_user_event().build()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(event_loop.create_proxy(), runtime)?;
    event_loop.run_app(&mut app)?;

    Ok(())
}
