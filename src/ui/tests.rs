use super::state::{NotificationLevel, PendingConfirmAction, PendingFileOperation};
use super::*;
use crate::editor::Selection;
use crate::types::NodeKind;
use eframe::egui;

fn raw_input(events: Vec<egui::Event>, time: f64) -> egui::RawInput {
    let mut raw = egui::RawInput::default();
    raw.screen_rect = Some(egui::Rect::from_min_size(
        egui::Pos2::ZERO,
        egui::vec2(1200.0, 800.0),
    ));
    raw.time = Some(time);
    raw.events = events;
    raw
}

/// Runs one frame of the canvas on a shared context so interaction state persists.
fn canvas_frame(ctx: &egui::Context, app: &mut TopologyApp, events: Vec<egui::Event>) {
    let _ = ctx.run(raw_input(events, 0.0), |ctx| {
        egui::CentralPanel::default().show(ctx, |ui| {
            app.draw_canvas(ui);
        });
    });
}

fn key(key: egui::Key, modifiers: egui::Modifiers) -> egui::Event {
    egui::Event::Key {
        key,
        physical_key: None,
        pressed: true,
        repeat: false,
        modifiers,
    }
}

fn press(pos: egui::Pos2) -> Vec<egui::Event> {
    vec![
        egui::Event::PointerMoved(pos),
        egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed: true,
            modifiers: egui::Modifiers::NONE,
        },
    ]
}

fn release(pos: egui::Pos2) -> Vec<egui::Event> {
    vec![egui::Event::PointerButton {
        pos,
        button: egui::PointerButton::Primary,
        pressed: false,
        modifiers: egui::Modifiers::NONE,
    }]
}

fn keyboard_frame(app: &mut TopologyApp, events: Vec<egui::Event>) {
    let ctx = egui::Context::default();
    let _ = ctx.run(raw_input(events, 0.0), |ctx| {
        app.handle_keyboard(ctx);
    });
}

#[test]
fn clicking_canvas_selects_node() {
    let mut app = TopologyApp::default();
    let node = app.editor.add_node(NodeKind::Router, egui::pos2(200.0, 150.0));
    app.editor.set_tool(crate::editor::ToolMode::Select);

    let ctx = egui::Context::default();
    // First frame lays out the canvas and records its origin
    canvas_frame(&ctx, &mut app, vec![]);
    app.editor.close_property_panel();
    let click = app.canvas_origin + egui::vec2(200.0, 150.0);

    canvas_frame(&ctx, &mut app, vec![egui::Event::PointerMoved(click)]);
    canvas_frame(&ctx, &mut app, press(click));

    assert_eq!(app.editor.selection(), Selection::Node(node));
    assert!(app.editor.property_panel_open());
}

#[test]
fn dragging_node_on_canvas_moves_it_once_in_history() {
    let mut app = TopologyApp::default();
    let node = app.editor.add_node(NodeKind::Server, egui::pos2(200.0, 150.0));
    let history_before = app.editor.history().len();

    let ctx = egui::Context::default();
    canvas_frame(&ctx, &mut app, vec![]);
    let start = app.canvas_origin + egui::vec2(200.0, 150.0);
    let end = start + egui::vec2(60.0, 40.0);

    canvas_frame(&ctx, &mut app, vec![egui::Event::PointerMoved(start)]);
    canvas_frame(&ctx, &mut app, press(start));
    canvas_frame(&ctx, &mut app, vec![egui::Event::PointerMoved(end)]);
    canvas_frame(&ctx, &mut app, release(end));

    let moved = app.editor.topology().node(node).map(|n| n.pos());
    assert_eq!(moved, Some(egui::pos2(260.0, 190.0)));
    assert_eq!(app.editor.history().len(), history_before + 1);
}

#[test]
fn link_tool_connects_two_clicked_nodes() {
    let mut app = TopologyApp::default();
    let a = app.editor.add_node(NodeKind::Router, egui::pos2(100.0, 100.0));
    let b = app.editor.add_node(NodeKind::Switch, egui::pos2(300.0, 100.0));
    app.editor.set_tool(crate::editor::ToolMode::Link);

    let ctx = egui::Context::default();
    canvas_frame(&ctx, &mut app, vec![]);
    let first = app.canvas_origin + egui::vec2(100.0, 100.0);
    let second = app.canvas_origin + egui::vec2(300.0, 100.0);

    canvas_frame(&ctx, &mut app, vec![egui::Event::PointerMoved(first)]);
    canvas_frame(&ctx, &mut app, press(first));
    canvas_frame(&ctx, &mut app, release(first));
    canvas_frame(&ctx, &mut app, vec![egui::Event::PointerMoved(second)]);
    canvas_frame(&ctx, &mut app, press(second));
    canvas_frame(&ctx, &mut app, release(second));

    let edges = &app.editor.topology().connections;
    assert_eq!(edges.len(), 1);
    assert!(edges[0].joins(a, b));
}

#[test]
fn delete_key_stages_confirmation() {
    let mut app = TopologyApp::default();
    let node = app.editor.add_node(NodeKind::Firewall, egui::pos2(0.0, 0.0));

    keyboard_frame(&mut app, vec![key(egui::Key::Delete, egui::Modifiers::NONE)]);

    assert_eq!(
        app.editor.pending_delete(),
        Some(crate::editor::DeleteTarget::Node(node))
    );
    assert!(app.editor.topology().node(node).is_some());

    keyboard_frame(&mut app, vec![key(egui::Key::Escape, egui::Modifiers::NONE)]);
    assert_eq!(app.editor.pending_delete(), None);
}

#[test]
fn command_z_undoes_last_change() {
    let mut app = TopologyApp::default();
    app.editor.add_node(NodeKind::Cloud, egui::pos2(0.0, 0.0));
    assert_eq!(app.editor.topology().devices.len(), 1);

    keyboard_frame(&mut app, vec![key(egui::Key::Z, egui::Modifiers::COMMAND)]);

    assert!(app.editor.topology().devices.is_empty());
    assert!(app.editor.can_redo());
}

#[test]
fn command_s_queues_storage_save() {
    let mut app = TopologyApp::default();
    keyboard_frame(&mut app, vec![key(egui::Key::S, egui::Modifiers::COMMAND)]);
    assert_eq!(app.file.pending, Some(PendingFileOperation::SaveToStorage));
}

#[test]
fn new_with_unsaved_changes_asks_first() {
    let mut app = TopologyApp::default();
    app.editor.add_node(NodeKind::Database, egui::pos2(0.0, 0.0));
    assert!(app.editor.is_dirty());

    app.request_new();

    assert_eq!(app.file.pending_confirm, Some(PendingConfirmAction::New));
    assert_eq!(app.editor.topology().devices.len(), 1);
}

#[test]
fn new_without_changes_clears_immediately() {
    let mut app = TopologyApp::default();
    app.editor.add_node(NodeKind::Database, egui::pos2(0.0, 0.0));
    app.editor.mark_saved();

    app.request_new();

    assert_eq!(app.file.pending_confirm, None);
    assert!(app.editor.topology().is_empty());
}

#[test]
fn open_with_unsaved_changes_asks_first() {
    let mut app = TopologyApp::default();
    app.editor.add_node(NodeKind::Other, egui::pos2(0.0, 0.0));

    app.request_open();

    assert_eq!(app.file.pending_confirm, Some(PendingConfirmAction::Open));
    assert_eq!(app.file.pending, None);
}

#[test]
fn typing_into_label_overlay_commits_on_enter() {
    let mut app = TopologyApp::default();
    let label = app.editor.start_new_label(egui::pos2(120.0, 80.0));

    let ctx = egui::Context::default();
    // Frame one shows the text field and focuses it
    canvas_frame(&ctx, &mut app, vec![]);
    canvas_frame(&ctx, &mut app, vec![egui::Event::Text("Server-1".into())]);
    canvas_frame(
        &ctx,
        &mut app,
        vec![key(egui::Key::Enter, egui::Modifiers::NONE)],
    );

    let committed = app.editor.topology().label(label).cloned();
    let committed = committed.expect("label should survive commit");
    assert_eq!(committed.text, "Server-1");
    assert!(!committed.is_editing);
    assert!(app.editor.text_edit().is_none());
}

#[test]
fn notifications_expire() {
    let mut app = TopologyApp::default();
    app.notify("Saved");
    app.notify_error("Broken");
    assert_eq!(app.notifications[1].level, NotificationLevel::Error);

    let ctx = egui::Context::default();
    let _ = ctx.run(raw_input(vec![], 1.0), |ctx| app.draw_notifications(ctx));
    assert_eq!(app.notifications.len(), 2);

    let _ = ctx.run(raw_input(vec![], 1.0 + NOTIFICATION_SECONDS + 0.5), |ctx| {
        app.draw_notifications(ctx)
    });
    assert!(app.notifications.is_empty());
}

#[test]
fn settings_round_trip_through_json() {
    let mut settings = AppSettings::default();
    settings.dark_mode = true;
    settings.show_minimap = false;
    settings.export.png_scale = 2.0;
    settings.editor.history_cap = 10;

    let json = settings.to_json().expect("serialize");
    let restored = AppSettings::from_json(&json).expect("deserialize");
    assert_eq!(restored, settings);
}

#[test]
fn settings_missing_fields_fall_back_to_defaults() {
    let restored = AppSettings::from_json(r#"{ "dark_mode": true }"#).expect("deserialize");
    assert!(restored.dark_mode);
    assert!(restored.show_grid);
    assert_eq!(restored.export, ExportOptions::default());
}

#[test]
fn svg_export_contains_device_and_label() {
    let mut app = TopologyApp::default();
    app.editor.set_canvas_size(egui::vec2(400.0, 300.0));
    app.editor.add_node(NodeKind::Router, egui::pos2(100.0, 100.0));
    app.editor.add_label(egui::pos2(200.0, 200.0), "Core <DC1>");

    let svg = app.export_svg();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("<circle"));
    assert!(svg.contains("Core &lt;DC1&gt;"));
}

#[test]
fn egui_text_metrics_measure_with_loaded_fonts() {
    use crate::hit_test::TextMetrics;

    let ctx = egui::Context::default();
    // Fonts are loaded by the first frame
    let _ = ctx.run(raw_input(vec![], 0.0), |_| {});
    let metrics = super::canvas::EguiTextMetrics::new(ctx.clone());

    let short = metrics.measure("core", 14.0);
    let long = metrics.measure("core switch rack 4", 14.0);
    assert!(short.x > 0.0);
    assert!(long.x > short.x);
    assert_eq!(short.y, 14.0);
}
