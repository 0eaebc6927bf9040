//! Sample widget process: a reorderable list, a scrolling log, an editbox,
//! a dialog and a background job.

use std::cell::RefCell;
use std::process::ExitCode;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};

use ply_grid::id::NO_HASH;
use ply_grid::prelude::*;
use ply_grid::widgets::{apply_move, button, checkbox, drag_item, editbox, text};

#[derive(Parser, Debug)]
#[command(name = "ply-grid-demo", about = "Example widget process for ply-grid-host")]
struct Args {
    /// TCP port the host listens on, on localhost.
    port: u16,
}

struct App {
    rows: Vec<String>,
    log: Vec<String>,
}

fn build(l: &mut Layout<'_>, app: &Rc<RefCell<App>>, name: &Bound<String>, compact: &Bound<bool>, counter: &Bound<i64>) {
    l.set_column_resizable(0, 3.0, 12.0, 6.0)
        .set_column(1, 6.0, 1000.0)
        .set_column_fill(1, 1.0)
        .set_row(0, 1.0, 1000.0);

    let mut dialog = l.add_dialog("About");
    dialog.set_column(0, 8.0, 8.0).set_row(0, 1.0, 1.0).set_row(1, 1.0, 1.0);
    let pal = *dialog.env().palette();
    dialog.props().background(pal.background).border(pal.border);
    text(&mut dialog, 0, 0, 1, 1, "ply-grid demo");
    button(&mut dialog, 0, 1, 1, 1, "Close", None, |ctx| ctx.cmds.close_dialog(NO_HASH));
    let dialog_hash = dialog.hash();

    // Left pane: reorderable rows.
    {
        let mut list = l.add_layout(0, 0, 1, 1);
        list.set_column(0, 3.0, 1000.0);
        let rows = app.borrow().rows.clone();
        for (i, row) in rows.iter().enumerate() {
            list.set_row(i, 1.0, 1.0);
            let app = Rc::clone(app);
            drag_item(&mut list, 0, i as i32, 1, 1, row, "rows", "main", i, move |mv, _| {
                let mut app = app.borrow_mut();
                if apply_move(&mut app.rows, mv) {
                    info!(from = mv.src_i, to = mv.target_index(), "row moved");
                }
            });
        }
    }

    // Right pane: form and log.
    let mut right = l.add_layout(1, 0, 1, 1);
    right
        .set_column_from_sub(0, 2.0, 6.0, false)
        .set_column(1, 4.0, 1000.0)
        .set_column_fill(1, 1.0);
    for y in 0..4 {
        right.set_row(y, 1.0, 1.0);
    }
    right.set_row(4, 3.0, 1000.0).set_row_fill(4, 1.0);

    text(&mut right, 0, 0, 1, 1, "Name");
    editbox(&mut right, 1, 0, 1, 1, erase(name), "your name", false);
    checkbox(&mut right, 0, 1, 1, 1, "Compact", compact.clone());

    let label = format!("Count ({})", counter.get());
    let job_counter = counter.clone();
    button(&mut right, 0, 2, 1, 1, &label, Some('j'), move |ctx| {
        let counter = job_counter.clone();
        ctx.jobs.start_job("count", "Count to ten", move |job| {
            for step in 1..=10 {
                if job.is_stopped() {
                    return;
                }
                thread::sleep(Duration::from_millis(200));
                let next = counter.get() + 1;
                counter.set(next);
                job.set_progress(step as f32 / 10.0);
            }
        });
    });
    button(&mut right, 1, 2, 1, 1, "About", Some('a'), move |ctx| ctx.cmds.open_dialog(dialog_hash));

    let mut log = right.add_layout(0, 4, 2, 1);
    log.set_column(0, 4.0, 1000.0);
    let lines = app.borrow().log.clone();
    let row_h = if compact.get() { 0.75 } else { 1.0 };
    for (i, line) in lines.iter().enumerate() {
        log.set_row(i, row_h, row_h);
        text(&mut log, 0, i as i32, 1, 1, line);
    }
    let log_hash = log.hash();
    let greeting = format!("Hello, {}", name.get());
    text(&mut right, 1, 1, 1, 1, &greeting);
    let app = Rc::clone(app);
    button(&mut right, 0, 3, 2, 1, "Add log line, scroll to end", Some('l'), move |ctx| {
        let mut app = app.borrow_mut();
        let n = app.log.len();
        app.log.push(format!("log line {n}"));
        ctx.cmds.vscroll_to_bottom(log_hash);
    });
}

fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();

    let app = Rc::new(RefCell::new(App {
        rows: (1..=8).map(|i| format!("Item {i}")).collect(),
        log: (0..40).map(|i| format!("log line {i}")).collect(),
    }));
    let name = Bound::new(String::from("world"));
    let compact = Bound::new(false);
    let counter = Bound::new(0i64);

    let state = Rc::clone(&app);
    let mut server = WidgetServer::new(move |l| build(l, &state, &name, &compact, &counter));
    server.on_save(move |_| {
        info!(rows = app.borrow().rows.len(), "save requested");
    });

    match run_tcp(args.port, &mut server) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "widget process failed");
            ExitCode::FAILURE
        }
    }
}
