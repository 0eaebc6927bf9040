//! Widget-process side of the protocol.

use std::io::{Read, Write};
use std::net::{Ipv4Addr, TcpStream};
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error, info, warn};

use crate::env::Environment;
use crate::errors::Result;
use crate::id::NO_HASH;
use crate::math::CellRect;
use crate::protocol::{Buffers, InputMsg, Opcode, RectsMsg, RefreshTail, Wire};
use crate::tree::{Layout, Tree, WidgetCtx};

pub type SaveFn = Box<dyn FnMut(&mut WidgetCtx)>;

/// Owns the layout tree and answers the host's requests.
pub struct WidgetServer {
    tree: Tree,
    ctx: WidgetCtx,
    on_save: Option<SaveFn>,
}

impl WidgetServer {
    pub fn new<F>(root: F) -> Self
    where
        F: FnMut(&mut Layout<'_>) + 'static,
    {
        let mut tree = Tree::new();
        tree.set_root(root);
        Self {
            tree,
            ctx: WidgetCtx::new(Environment::default()),
            on_save: None,
        }
    }

    /// Called on `SAVE` so the application can persist its data.
    pub fn on_save<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut(&mut WidgetCtx) + 'static,
    {
        self.on_save = Some(Box::new(f));
        self
    }

    pub fn ctx(&mut self) -> &mut WidgetCtx {
        &mut self.ctx
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Serves requests until `EXIT` or a protocol error.
    pub fn serve<R: Read, W: Write>(&mut self, wire: &mut Wire<R, W>) -> Result<()> {
        loop {
            let op = wire.read_op()?;
            match op {
                Opcode::Exit => {
                    info!("exit requested");
                    self.ctx.jobs.shutdown();
                    return Ok(());
                }
                Opcode::Save => {
                    if let Some(f) = self.on_save.as_mut() {
                        f(&mut self.ctx);
                    }
                }
                Opcode::GetEnv => {
                    wire.write_blob(&self.ctx.env)?;
                    wire.flush()?;
                }
                Opcode::SetEnv => {
                    let mut env: Environment = wire.read_blob()?;
                    env.sanitize();
                    debug!(dpi = env.dpi, "environment updated");
                    self.ctx.env = env;
                }
                Opcode::Refresh => self.refresh(wire)?,
                Opcode::Input => {
                    let msg: InputMsg = wire.read_blob()?;
                    self.input(&msg);
                    wire.write_blob(&self.ctx.cmds.drain())?;
                    wire.flush()?;
                }
                Opcode::Redraw => {
                    let rects: RectsMsg = wire.read_blob()?;
                    let buffers = self.draw(&rects);
                    wire.write_blob(&buffers)?;
                    wire.flush()?;
                }
            }
        }
    }

    fn refresh<R: Read, W: Write>(&mut self, wire: &mut Wire<R, W>) -> Result<()> {
        self.tree.rebuild(&mut self.ctx);

        loop {
            let hash = wire.read_u64()?;
            if hash == NO_HASH {
                break;
            }
            let env = &self.ctx.env;
            let tree = &mut self.tree;
            let snapshot = match panic::catch_unwind(AssertUnwindSafe(|| tree.snapshot(hash, env))) {
                Ok(s) => s,
                Err(_) => {
                    error!(hash = format_args!("{hash:#x}"), "snapshot callback panicked");
                    None
                }
            };

            let Some(node) = snapshot else {
                warn!(hash = format_args!("{hash:#x}"), "requested node not found");
                wire.write_bool(false)?;
                wire.flush()?;
                continue;
            };
            wire.write_bool(true)?;
            wire.write_blob(&node)?;
            wire.flush()?;

            let rects: RectsMsg = wire.read_blob()?;
            let buffers = self.draw(&rects);
            wire.write_blob(&buffers)?;
            wire.flush()?;
        }

        let tail = RefreshTail {
            cmds: self.ctx.cmds.drain(),
            jobs: self.ctx.jobs.report(),
        };
        wire.write_blob(&tail)?;
        wire.flush()
    }

    /// Runs `draw` for every node with a visible crop.
    pub fn draw(&mut self, rects: &RectsMsg) -> Buffers {
        let cell = rects.cell.max(1) as f32;
        let mut buffers = Buffers::new();
        for (&hash, r) in &rects.rects {
            if r.crop.is_empty() {
                continue;
            }
            let size = CellRect::sized(r.canvas.size.x as f32 / cell, r.canvas.size.y as f32 / cell);
            let env = &self.ctx.env;
            let tree = &mut self.tree;
            match panic::catch_unwind(AssertUnwindSafe(|| tree.draw(hash, size, env))) {
                Ok(Some(prims)) => {
                    buffers.insert(hash, prims);
                }
                Ok(None) => {}
                Err(_) => error!(hash = format_args!("{hash:#x}"), "draw callback panicked"),
            }
        }
        buffers
    }

    /// Delivers one input. Shortcut keys go to the first node below the
    /// addressed one that handles them.
    pub fn input(&mut self, msg: &InputMsg) {
        let mut target = msg.hash;
        if let Some(key) = msg.input.shortcut_key {
            match self.tree.find_shortcut(msg.hash, key) {
                Some(hash) => target = hash,
                None => {
                    debug!(%key, "no node handles shortcut");
                    return;
                }
            }
        }
        let tree = &mut self.tree;
        let ctx = &mut self.ctx;
        let result = panic::catch_unwind(AssertUnwindSafe(|| tree.input(target, &msg.input, ctx)));
        match result {
            Ok(true) => {}
            Ok(false) => debug!(hash = format_args!("{target:#x}"), "input not handled"),
            Err(_) => error!(hash = format_args!("{target:#x}"), "input callback panicked"),
        }
    }
}

/// Connects to the host listening on `port` and serves until `EXIT`.
pub fn run_tcp(port: u16, server: &mut WidgetServer) -> Result<()> {
    let stream = TcpStream::connect((Ipv4Addr::LOCALHOST, port))?;
    info!(port, "connected to host");
    let mut wire = Wire::tcp(stream)?;
    server.serve(&mut wire)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::id::ROOT_HASH;
    use crate::math::RectPx;
    use crate::protocol::WireRect;

    fn server() -> WidgetServer {
        WidgetServer::new(|l| {
            l.set_column(0, 1.0, 10.0);
            l.add_child("Box", 0, 0, 1, 1).on_draw(|r, p, _| {
                p.rect(r, Color::BLACK);
            });
        })
    }

    #[test]
    fn hidden_nodes_are_not_drawn() {
        let mut s = server();
        s.tree.rebuild(&mut s.ctx);
        let env = Environment::default();
        let child = s.tree.snapshot(ROOT_HASH, &env).unwrap().children[0].hash;

        let mut rects = RectsMsg {
            cell: 40,
            ..Default::default()
        };
        let visible = WireRect {
            canvas: RectPx::new(0, 0, 80, 40),
            crop: RectPx::new(0, 0, 80, 40),
        };
        rects.rects.insert(child, visible);
        let buffers = s.draw(&rects);
        assert_eq!(buffers[&child][0].rect(), CellRect::sized(2.0, 1.0));

        rects.rects.insert(
            child,
            WireRect {
                crop: RectPx::new(0, 0, 0, 40),
                ..visible
            },
        );
        assert!(s.draw(&rects).is_empty());
    }

    #[test]
    fn panicking_draw_is_contained() {
        let mut s = WidgetServer::new(|l| {
            l.add_child("Bad", 0, 0, 1, 1).on_draw(|_, _, _| panic!("bad draw"));
        });
        s.tree.rebuild(&mut s.ctx);
        let env = Environment::default();
        let child = s.tree.snapshot(ROOT_HASH, &env).unwrap().children[0].hash;
        let mut rects = RectsMsg {
            cell: 40,
            ..Default::default()
        };
        let r = RectPx::new(0, 0, 40, 40);
        rects.rects.insert(child, WireRect { canvas: r, crop: r });
        assert!(s.draw(&rects).is_empty());
    }
}
