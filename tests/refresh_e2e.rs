//! Host and widget talking over a real loopback connection, with the widget
//! served from its own thread.

use std::net::{Ipv4Addr, TcpListener};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use ply_grid::env::Environment;
use ply_grid::host::Host;
use ply_grid::id::ROOT_HASH;
use ply_grid::input::{DropMove, DropPos, Key, RawInput};
use ply_grid::layout::Axis;
use ply_grid::math::Vec2i;
use ply_grid::resolve::ResolvedNode;
use ply_grid::settings::Settings;
use ply_grid::text::{AutoSize, MonoMeasure};
use ply_grid::widget::{run_tcp, WidgetServer};
use ply_grid::widgets::{button, drag_item, text};

struct Session {
    host: Host,
    widget: JoinHandle<ply_grid::Result<()>>,
    measure: MonoMeasure,
    time: f64,
}

impl Session {
    /// `make` runs on the widget thread; the tree is not `Send`.
    fn start<F>(window: Vec2i, make: F) -> Self
    where
        F: FnOnce() -> WidgetServer + Send + 'static,
    {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        let port = listener.local_addr().unwrap().port();
        let widget = thread::spawn(move || {
            let mut server = make();
            run_tcp(port, &mut server)
        });
        let (stream, _) = listener.accept().unwrap();
        let host = Host::connect(stream, Settings::default(), Environment::default(), window).unwrap();
        Self {
            host,
            widget,
            measure: MonoMeasure::default(),
            time: 0.0,
        }
    }

    fn refresh(&mut self) -> ply_grid::diff::FrameDiff {
        self.host.refresh(&self.measure).unwrap()
    }

    fn tick(&mut self, pointer: Vec2i, left_down: bool, keys: Vec<Key>) {
        self.time += 0.1;
        let raw = RawInput {
            time: self.time,
            window: self.host.window(),
            pointer,
            left_down,
            keys,
            ..Default::default()
        };
        self.host.tick(&raw, &self.measure).unwrap();
    }

    fn click(&mut self, at: Vec2i) {
        self.tick(at, true, Vec::new());
        self.tick(at, false, Vec::new());
    }

    fn named(&self, name: &str) -> &ResolvedNode {
        self.host
            .frame()
            .tree
            .levels
            .iter()
            .flat_map(|l| &l.nodes)
            .find(|n| n.key.name == name)
            .unwrap_or_else(|| panic!("no node named {name}"))
    }

    fn root(&self) -> &ResolvedNode {
        &self.host.frame().tree.levels[0].nodes[0]
    }

    fn finish(self) {
        assert_eq!(self.host.exit().unwrap(), None);
        self.widget.join().unwrap().unwrap();
    }
}

#[test]
fn damage_collects_until_taken() {
    let mut s = Session::start(Vec2i::new(400, 40), || {
        WidgetServer::new(|l| {
            l.set_column(0, 1.0, 100.0).set_column(1, 3.0, 3.0);
            text(l, 0, 0, 1, 1, "left");
            text(l, 1, 0, 1, 1, "right");
        })
    });
    s.refresh();
    s.refresh();
    let damage = s.host.take_damage();
    assert!(damage.relayout.contains(&ROOT_HASH));
    assert!(!damage.repaint.is_empty());

    s.refresh();
    assert!(s.host.take_damage().is_empty());

    s.host.set_window(Vec2i::new(300, 40));
    s.refresh();
    let level = &s.host.frame().tree.levels[0];
    let children: Vec<_> = s.root().children.iter().map(|&i| level.nodes[i].hash).collect();
    assert_eq!(children.len(), 2);
    let damage = s.host.take_damage();
    assert!(damage.relayout.contains(&ROOT_HASH));
    assert!(children.iter().all(|h| damage.relayout.contains(h)));
    assert!(damage.removed.is_empty());
    s.finish();
}

#[test]
fn columns_resolve_and_unchanged_refresh_is_empty() {
    let mut s = Session::start(Vec2i::new(400, 40), || {
        WidgetServer::new(|l| {
            l.set_column(0, 1.0, 100.0).set_column(1, 3.0, 3.0);
            text(l, 0, 0, 1, 1, "left");
            text(l, 1, 0, 1, 1, "right");
        })
    });
    let first = s.refresh();
    assert!(!first.repaint.is_empty());
    assert_eq!(s.root().cols, vec![280, 120]);

    let buffers = s.host.frame().buffers.clone();
    let second = s.refresh();
    assert!(second.is_empty(), "{second:?}");
    assert_eq!(s.host.frame().buffers, buffers);
    s.finish();
}

#[test]
fn scroll_to_bottom_pins_the_wheel_to_the_end() {
    let mut s = Session::start(Vec2i::new(400, 400), || {
        WidgetServer::new(|l| {
            l.set_column(0, 1.0, 100.0);
            for y in 0..50 {
                l.set_row(y, 1.0, 1.0);
            }
            button(l, 0, 0, 1, 1, "End", None, |ctx| ctx.cmds.vscroll_to_bottom(ROOT_HASH));
            for y in 1..50 {
                text(l, 0, y, 1, 1, "row");
            }
        })
    });
    s.refresh();
    assert_eq!(s.root().v_scroll.wheel, 0);

    s.click(Vec2i::new(20, 20));
    let root = s.root();
    assert_eq!(root.v_scroll.data, 2000);
    assert_eq!(root.v_scroll.wheel, 1600);
    assert_eq!(root.crop.size.y, 400);
    assert_eq!(s.host.settings.scroll(ROOT_HASH, Axis::Y), 1600);
    s.finish();
}

#[test]
fn dialog_opens_below_the_button_that_opened_it() {
    let mut s = Session::start(Vec2i::new(800, 600), || {
        WidgetServer::new(|l| {
            l.set_column(0, 2.5, 2.5).set_column(1, 2.0, 2.0);
            l.set_row(0, 5.0, 5.0).set_row(1, 0.5, 0.5);
            let dialog = {
                let mut d = l.add_dialog("menu");
                d.set_column(0, 4.0, 4.0).set_row(0, 3.0, 3.0);
                d.hash()
            };
            let mut opener = l.add_child("Opener", 1, 1, 1, 1);
            let me = opener.hash();
            opener.on_input(move |input, ctx| {
                if input.is_clicked(1, false) {
                    ctx.cmds.open_dialog_relative(dialog, me);
                }
            });
        })
    });
    s.refresh();
    let opener = s.named("Opener");
    assert_eq!((opener.rect.start.x, opener.rect.start.y), (100, 200));
    assert_eq!((opener.rect.size.x, opener.rect.size.y), (80, 20));

    s.click(Vec2i::new(120, 210));
    assert_eq!(s.host.settings.dialogs.len(), 1);
    let levels = &s.host.frame().tree.levels;
    assert_eq!(levels.len(), 2);
    assert_eq!(levels[1].rect.start.x, 100);
    assert_eq!(levels[1].rect.start.y, 220);

    // A press outside the dialog closes it.
    s.click(Vec2i::new(700, 50));
    assert!(s.host.settings.dialogs.is_empty());
    assert_eq!(s.host.frame().tree.levels.len(), 1);
    s.finish();
}

#[test]
fn opening_and_closing_in_one_batch_changes_nothing() {
    let mut s = Session::start(Vec2i::new(400, 400), || {
        WidgetServer::new(|l| {
            l.set_column(0, 4.0, 4.0).set_row(0, 1.0, 1.0);
            let dialog = {
                let mut d = l.add_dialog("flash");
                d.set_column(0, 2.0, 2.0).set_row(0, 1.0, 1.0);
                d.hash()
            };
            button(l, 0, 0, 1, 1, "Flash", None, move |ctx| {
                ctx.cmds.open_dialog(dialog);
                ctx.cmds.close_dialog(dialog);
            });
        })
    });
    s.refresh();
    let before: Vec<_> = s.host.frame().tree.levels[0].nodes.iter().map(|n| n.hash).collect();

    s.click(Vec2i::new(20, 20));
    assert!(s.host.settings.dialogs.is_empty());
    let levels = &s.host.frame().tree.levels;
    assert_eq!(levels.len(), 1);
    let after: Vec<_> = levels[0].nodes.iter().map(|n| n.hash).collect();
    assert_eq!(before, after);
    s.finish();
}

#[test]
fn dragging_a_row_onto_the_upper_half_of_a_later_row() {
    let moves: Arc<Mutex<Vec<DropMove>>> = Arc::default();
    let sink = Arc::clone(&moves);
    let mut s = Session::start(Vec2i::new(400, 400), move || {
        WidgetServer::new(move |l| {
            l.set_column(0, 1.0, 100.0);
            for i in 0..8 {
                l.set_row(i, 1.0, 1.0);
                let sink = Arc::clone(&sink);
                drag_item(l, 0, i as i32, 1, 1, "row", "rows", "live", i, move |mv, _| {
                    sink.lock().unwrap().push(mv.clone());
                });
            }
        })
    });
    s.refresh();

    s.tick(Vec2i::new(50, 100), true, Vec::new());
    s.tick(Vec2i::new(50, 205), true, Vec::new());
    s.tick(Vec2i::new(50, 205), false, Vec::new());

    let moves = moves.lock().unwrap();
    assert_eq!(moves.len(), 1);
    let mv = &moves[0];
    assert_eq!((mv.src_i, mv.dst_i), (2, 5));
    assert_eq!((mv.src_source.as_str(), mv.dst_source.as_str()), ("live", "live"));
    assert_eq!(mv.pos, DropPos::VerticalBefore);
    assert_eq!(mv.target_index(), 4);
    drop(moves);
    s.finish();
}

#[test]
fn editbox_commit_is_delivered_once() {
    let value = Arc::new(Mutex::new(String::from("abc")));
    let commits = Arc::new(AtomicUsize::new(0));
    let (v, c) = (Arc::clone(&value), Arc::clone(&commits));
    let mut s = Session::start(Vec2i::new(400, 400), move || {
        WidgetServer::new(move |l| {
            l.set_column(0, 4.0, 4.0).set_row(0, 1.0, 1.0);
            let (get, set, count) = (Arc::clone(&v), Arc::clone(&v), Arc::clone(&c));
            l.add_child("Field", 0, 0, 1, 1).on_editbox(
                move || get.lock().unwrap().clone(),
                move |text, commit, ctx| {
                    if commit {
                        count.fetch_add(1, Ordering::SeqCst);
                    }
                    *set.lock().unwrap() = text.to_string();
                    ctx.cmds.refresh();
                },
            );
        })
    });
    s.refresh();
    assert_eq!(s.named("Field").edit_value.as_deref(), Some("abc"));

    s.click(Vec2i::new(20, 20));
    assert!(s.host.interaction.edit().is_some());
    s.tick(Vec2i::new(20, 20), false, vec![Key::Char('d')]);
    assert_eq!(commits.load(Ordering::SeqCst), 0);
    s.tick(Vec2i::new(20, 20), false, vec![Key::Enter]);
    s.tick(Vec2i::new(20, 20), false, Vec::new());

    assert_eq!(commits.load(Ordering::SeqCst), 1);
    assert_eq!(*value.lock().unwrap(), "abcd");
    assert!(s.host.interaction.edit().is_none());
    assert_eq!(s.named("Field").edit_value.as_deref(), Some("abcd"));
    s.finish();
}

#[test]
fn persisted_column_size_survives_the_declared_bounds() {
    let mut s = Session::start(Vec2i::new(1000, 40), || {
        WidgetServer::new(|l| {
            l.set_column(0, 1.0, 1.0).set_column_resizable(1, 1.0, 3.0, 3.0);
        })
    });
    s.refresh();
    assert_eq!(s.root().cols, vec![40, 120]);

    s.host.settings.set_resize(ROOT_HASH, Axis::X, 1, 5.0);
    s.refresh();
    assert_eq!(s.root().cols, vec![40, 200]);
    s.finish();
}

#[test]
fn empty_multiline_text_keeps_its_row() {
    let mut s = Session::start(Vec2i::new(400, 400), || {
        WidgetServer::new(|l| {
            l.set_column(0, 5.0, 5.0).set_row_from_sub(0, 0.0, 10.0, false);
            l.add_child("Notes", 0, 0, 1, 1).on_auto_resize(|_| AutoSize::Text {
                text: String::new(),
                multiline: true,
                linewrap: true,
                margin: 0.1,
                max_width: 5.0,
            });
        })
    });
    s.refresh();
    assert_eq!(s.root().rows, vec![40]);
    s.finish();
}

#[test]
fn environment_and_save_round_trip() {
    let saves = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&saves);
    let mut s = Session::start(Vec2i::new(400, 400), move || {
        let mut server = WidgetServer::new(|l| {
            l.set_column(0, 1.0, 1.0);
        });
        server.on_save(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        server
    });
    assert_eq!(s.host.get_env().unwrap().dpi, Environment::default().dpi);

    s.host.env.dpi = 150;
    s.host.set_env().unwrap();
    assert_eq!(s.host.get_env().unwrap().dpi, 150);

    s.host.save().unwrap();
    // Save has no reply; a later round trip orders it.
    s.host.get_env().unwrap();
    assert_eq!(saves.load(Ordering::SeqCst), 1);
    s.finish();
}
