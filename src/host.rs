//! Host side of the protocol: owns the widget process, the persisted
//! settings and the last resolved [`Frame`].

use std::collections::BTreeSet;
use std::io::{BufReader, BufWriter, ErrorKind};
use std::net::{Ipv4Addr, TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::commands::LayoutCmd;
use crate::diff::{Frame, FrameDiff};
use crate::env::Environment;
use crate::errors::{Error, Result};
use crate::id::{NodeHash, NO_HASH, ROOT_HASH};
use crate::input::RawInput;
use crate::interaction::{Interaction, NodeEvent, TickOutput};
use crate::jobs::JobsReport;
use crate::layout::Axis;
use crate::math::Vec2i;
use crate::node::LayoutNode;
use crate::protocol::{Buffers, InputMsg, Opcode, RectsMsg, RefreshTail, Wire};
use crate::resolve::Resolver;
use crate::scroll::PIN_END;
use crate::settings::Settings;
use crate::text::TextMeasure;

type TcpWire = Wire<BufReader<TcpStream>, BufWriter<TcpStream>>;

const ACCEPT_TIMEOUT: Duration = Duration::from_secs(10);
const EXIT_GRACE: Duration = Duration::from_millis(500);
/// Refresh interval while widget jobs are running.
const JOB_POLL_SECS: f64 = 1.0;
/// Refreshes requested by a refresh's own tail are followed this many
/// times per tick before the rest waits for the next frame.
const MAX_CHAINED_REFRESHES: usize = 3;

struct WidgetProcess {
    program: PathBuf,
    child: Child,
}

impl WidgetProcess {
    fn poll_exit_code(&mut self) -> Result<Option<i32>> {
        let status = self.child.try_wait()?;
        Ok(status.and_then(|s| s.code()))
    }

    /// Waits briefly for a voluntary exit, then kills.
    fn shutdown(&mut self) -> Result<Option<i32>> {
        let deadline = Instant::now() + EXIT_GRACE;
        loop {
            if let Some(status) = self.child.try_wait()? {
                return Ok(status.code());
            }
            if Instant::now() >= deadline {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        if let Err(err) = self.child.kill() {
            if err.kind() != ErrorKind::InvalidInput {
                return Err(Error::Process(format!("failed to kill widget: {err}")));
            }
        }
        Ok(self.child.wait()?.code())
    }
}

/// Starts `program` with the port of a fresh loopback listener and accepts
/// its single connection.
fn launch(program: &Path) -> Result<(WidgetProcess, TcpWire)> {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))?;
    let port = listener.local_addr()?.port();
    let child = Command::new(program)
        .arg(port.to_string())
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|err| Error::Process(format!("failed to spawn {}: {err}", program.display())))?;
    let mut process = WidgetProcess {
        program: program.to_path_buf(),
        child,
    };
    info!(program = %program.display(), port, pid = process.child.id(), "widget process started");

    listener.set_nonblocking(true)?;
    let deadline = Instant::now() + ACCEPT_TIMEOUT;
    let stream = loop {
        match listener.accept() {
            Ok((stream, _)) => break stream,
            Err(err) if err.kind() == ErrorKind::WouldBlock => {
                if let Some(code) = process.poll_exit_code()? {
                    return Err(Error::Process(format!("widget exited with {code} before connecting")));
                }
                if Instant::now() >= deadline {
                    let _ = process.shutdown();
                    return Err(Error::Process("widget did not connect in time".into()));
                }
                thread::sleep(Duration::from_millis(10));
            }
            Err(err) => return Err(err.into()),
        }
    };
    stream.set_nonblocking(false)?;
    Ok((process, Wire::tcp(stream)?))
}

/// One host session: a connected widget process plus everything the host
/// keeps between refreshes.
pub struct Host {
    wire: TcpWire,
    process: Option<WidgetProcess>,
    pub settings: Settings,
    settings_path: Option<PathBuf>,
    pub env: Environment,
    pub interaction: Interaction,
    frame: Frame,
    window: Vec2i,
    now: f64,
    refresh_at: Option<f64>,
    pending_refresh: bool,
    redraw: BTreeSet<NodeHash>,
    jobs: JobsReport,
    last_job_poll: f64,
    recompile: bool,
    /// Changes since the renderer last asked, see [`Host::take_damage`].
    damage: FrameDiff,
}

impl Host {
    /// Launches the widget process and pushes the environment.
    pub fn spawn(program: impl AsRef<Path>, settings_path: Option<PathBuf>, env: Environment, window: Vec2i) -> Result<Self> {
        let settings = match &settings_path {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        let (process, wire) = launch(program.as_ref())?;
        let mut host = Self::with_wire(wire, settings, env, window);
        host.process = Some(process);
        host.settings_path = settings_path;
        host.set_env()?;
        Ok(host)
    }

    /// Uses an already connected widget, e.g. one served from another thread.
    pub fn connect(stream: TcpStream, settings: Settings, env: Environment, window: Vec2i) -> Result<Self> {
        let mut host = Self::with_wire(Wire::tcp(stream)?, settings, env, window);
        host.set_env()?;
        Ok(host)
    }

    fn with_wire(wire: TcpWire, settings: Settings, env: Environment, window: Vec2i) -> Self {
        Self {
            wire,
            process: None,
            settings,
            settings_path: None,
            env,
            interaction: Interaction::new(),
            frame: Frame::default(),
            window,
            now: 0.0,
            refresh_at: None,
            pending_refresh: true,
            redraw: BTreeSet::new(),
            jobs: JobsReport::default(),
            last_job_poll: 0.0,
            recompile: false,
            damage: FrameDiff::default(),
        }
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Everything that changed since the last call: nodes to lay out again,
    /// buffers to repaint and hashes gone from the frame.
    pub fn take_damage(&mut self) -> FrameDiff {
        std::mem::take(&mut self.damage)
    }

    /// Split borrow for drawing: the frame, the interaction state and the
    /// environment.
    pub fn parts_mut(&mut self) -> (&Frame, &mut Interaction, &Environment) {
        (&self.frame, &mut self.interaction, &self.env)
    }

    pub fn window(&self) -> Vec2i {
        self.window
    }

    pub fn set_window(&mut self, window: Vec2i) {
        if window != self.window {
            self.window = window;
            self.pending_refresh = true;
        }
    }

    pub fn jobs(&self) -> JobsReport {
        self.jobs
    }

    pub fn needs_refresh(&self) -> bool {
        self.pending_refresh
    }

    pub fn request_refresh(&mut self) {
        self.pending_refresh = true;
    }

    /// Runs the full `REFRESH` exchange and replaces the current frame.
    pub fn refresh(&mut self, measure: &dyn TextMeasure) -> Result<FrameDiff> {
        self.pending_refresh = false;
        self.redraw.clear();
        let Host {
            wire,
            settings,
            env,
            window,
            ..
        } = self;

        settings.begin_refresh();
        let dialogs = settings.dialogs.clone();
        let mut buffers = Buffers::new();
        let mut missing = Vec::new();

        wire.write_op(Opcode::Refresh)?;
        let tree = {
            let mut resolver = Resolver::new(settings, measure, env.cell_px(), *window);
            match query(wire, ROOT_HASH)? {
                Some(root) => {
                    let rects = resolver.resolve_root(&root);
                    buffers.extend(exchange(wire, &rects)?);
                }
                None => warn!("widget returned no root"),
            }
            for entry in &dialogs {
                let Some(node) = query(wire, entry.hash)? else {
                    warn!(hash = format_args!("{:#x}", entry.hash), "dialog no longer exists");
                    missing.push(entry.hash);
                    continue;
                };
                let rects = resolver.resolve_dialog(&node, entry);
                buffers.extend(exchange(wire, &rects)?);
            }
            wire.write_u64(NO_HASH)?;
            wire.flush()?;
            resolver.finish()
        };
        let tail: RefreshTail = wire.read_blob()?;

        if !missing.is_empty() {
            settings.dialogs.retain(|d| !missing.contains(&d.hash));
        }
        settings.maintenance();

        let frame = Frame::new(tree, buffers);
        let diff = frame.diff(&self.frame);
        self.frame = frame;
        self.interaction.sync(&self.frame);
        debug!(
            nodes = self.frame.tree.node_count(),
            relayout = diff.relayout.len(),
            repaint = diff.repaint.len(),
            removed = diff.removed.len(),
            cmds = tail.cmds.len(),
            "refresh done"
        );

        self.jobs = tail.jobs;
        if tail.jobs.need_refresh {
            self.pending_refresh = true;
        }
        self.apply_commands(tail.cmds);
        self.damage.merge(diff.clone());
        Ok(diff)
    }

    /// Applies widget commands in order.
    pub fn apply_commands(&mut self, cmds: Vec<LayoutCmd>) {
        for cmd in cmds {
            if self.interaction.command(&cmd, &self.frame) {
                continue;
            }
            match cmd {
                LayoutCmd::VScrollToTop(hash) => self.scroll_to(hash, Axis::Y, 0),
                LayoutCmd::VScrollToBottom(hash) => self.scroll_to(hash, Axis::Y, PIN_END),
                LayoutCmd::HScrollToLeft(hash) => self.scroll_to(hash, Axis::X, 0),
                LayoutCmd::OpenDialog {
                    hash,
                    relative_to,
                    anchor,
                } => {
                    self.settings.open_dialog(hash, relative_to, anchor);
                    self.pending_refresh = true;
                }
                LayoutCmd::CloseDialog(hash) => {
                    if self.settings.close_dialog(hash) {
                        self.pending_refresh = true;
                    }
                }
                LayoutCmd::CloseAllDialogs => {
                    if !self.settings.dialogs.is_empty() {
                        self.settings.close_all_dialogs();
                        self.pending_refresh = true;
                    }
                }
                LayoutCmd::Recompile => self.recompile = true,
                LayoutCmd::Refresh => self.pending_refresh = true,
                LayoutCmd::RefreshDelayed { secs } => {
                    let at = self.now + f64::from(secs.max(0.0));
                    self.refresh_at = Some(self.refresh_at.map_or(at, |t| t.min(at)));
                }
                LayoutCmd::Redraw(hash) => {
                    self.redraw.insert(hash);
                }
                LayoutCmd::Copy
                | LayoutCmd::Cut
                | LayoutCmd::Paste
                | LayoutCmd::SelectAll
                | LayoutCmd::Record
                | LayoutCmd::SetClipboard(_)
                | LayoutCmd::ActivateEditbox(_) => {}
            }
        }
    }

    fn scroll_to(&mut self, hash: NodeHash, axis: Axis, wheel: i32) {
        self.settings.set_scroll(hash, axis, wheel);
        self.pending_refresh = true;
    }

    /// Delivers one event with `INPUT` and applies the returned commands.
    pub fn input(&mut self, event: &NodeEvent) -> Result<()> {
        self.wire.write_op(Opcode::Input)?;
        self.wire.write_blob(&InputMsg {
            hash: event.hash,
            input: event.input.clone(),
        })?;
        self.wire.flush()?;
        let cmds: Vec<LayoutCmd> = self.wire.read_blob()?;
        debug!(hash = format_args!("{:#x}", event.hash), cmds = cmds.len(), "input delivered");
        self.pending_refresh = true;
        self.apply_commands(cmds);
        Ok(())
    }

    /// Redraws the nodes queued with `LayoutCmd::Redraw`. Returns the number
    /// of replaced buffers.
    pub fn redraw(&mut self) -> Result<usize> {
        let hashes = std::mem::take(&mut self.redraw);
        let mut rects = RectsMsg {
            cell: self.frame.tree.cell,
            ..Default::default()
        };
        for hash in hashes {
            match self.frame.tree.find(hash) {
                Some((_, node)) => {
                    rects.rects.insert(hash, node.wire_rect());
                }
                None => debug!(hash = format_args!("{hash:#x}"), "redraw of unknown node"),
            }
        }
        if rects.rects.is_empty() {
            return Ok(0);
        }
        self.wire.write_op(Opcode::Redraw)?;
        self.wire.write_blob(&rects)?;
        self.wire.flush()?;
        let buffers: Buffers = self.wire.read_blob()?;
        let applied = self.frame.apply_redraw(buffers);
        let count = applied.len();
        self.damage.repaint.extend(applied);
        Ok(count)
    }

    /// Pushes the host's environment with `SET_ENV`.
    pub fn set_env(&mut self) -> Result<()> {
        self.env.sanitize();
        self.wire.write_op(Opcode::SetEnv)?;
        self.wire.write_blob(&self.env)?;
        self.wire.flush()
    }

    /// Reads the widget's copy of the environment.
    pub fn get_env(&mut self) -> Result<Environment> {
        self.wire.write_op(Opcode::GetEnv)?;
        self.wire.flush()?;
        self.wire.read_blob()
    }

    /// Asks the widget to persist and writes the settings file.
    pub fn save(&mut self) -> Result<()> {
        self.wire.write_op(Opcode::Save)?;
        self.wire.flush()?;
        if let Some(path) = &self.settings_path {
            self.settings.save(path)?;
            debug!(path = %path.display(), "settings saved");
        }
        Ok(())
    }

    /// Sends `EXIT` and reaps the widget process. Returns its exit code when
    /// it had one.
    pub fn exit(mut self) -> Result<Option<i32>> {
        if let Err(err) = self.wire.write_op(Opcode::Exit).and_then(|_| self.wire.flush()) {
            debug!(%err, "widget gone before exit");
        }
        match self.process.as_mut() {
            Some(process) => process.shutdown(),
            None => Ok(None),
        }
    }

    /// Replaces a broken widget process with a fresh one. Settings survive;
    /// the frame and interaction state start over.
    pub fn restart(&mut self) -> Result<()> {
        let Some(old) = self.process.as_mut() else {
            return Err(Error::Process("no widget process to restart".into()));
        };
        let program = old.program.clone();
        match old.shutdown() {
            Ok(code) => info!(?code, "widget process stopped"),
            Err(err) => warn!(%err, "failed to stop widget process"),
        }
        let (process, wire) = launch(&program)?;
        self.process = Some(process);
        self.wire = wire;
        let gone = std::mem::take(&mut self.frame).hashes();
        self.damage.removed.extend(gone);
        self.interaction = Interaction::new();
        self.redraw.clear();
        self.jobs = JobsReport::default();
        self.pending_refresh = true;
        self.set_env()
    }

    /// One frame of the main loop: interaction, `INPUT` round trips, then a
    /// refresh when one is due or a partial redraw otherwise.
    pub fn tick(&mut self, raw: &RawInput, measure: &dyn TextMeasure) -> Result<TickOutput> {
        self.now = raw.time;
        if raw.window.x > 0 && raw.window.y > 0 {
            self.set_window(raw.window);
        }
        let out = {
            let Host {
                interaction,
                frame,
                settings,
                env,
                ..
            } = self;
            interaction.tick(raw, frame, settings, env)
        };
        match self.step(&out, measure) {
            Ok(()) => {}
            Err(err) if err.is_fatal_protocol() && self.process.is_some() => {
                error!(%err, "protocol error, restarting widget process");
                self.restart()?;
            }
            Err(err) => return Err(err),
        }
        Ok(out)
    }

    fn step(&mut self, out: &TickOutput, measure: &dyn TextMeasure) -> Result<()> {
        if out.env_changed {
            self.set_env()?;
            self.pending_refresh = true;
        }
        if out.needs_refresh {
            self.pending_refresh = true;
        }
        for event in &out.events {
            self.input(event)?;
        }
        if std::mem::take(&mut self.recompile) {
            info!("widget requested a restart");
            self.restart()?;
        }
        if self.refresh_at.is_some_and(|at| self.now >= at) {
            self.refresh_at = None;
            self.pending_refresh = true;
        }
        if self.jobs.running > 0 && self.now - self.last_job_poll >= JOB_POLL_SECS {
            self.last_job_poll = self.now;
            self.pending_refresh = true;
        }

        let mut rounds = 0;
        while self.pending_refresh && rounds < MAX_CHAINED_REFRESHES {
            self.refresh(measure)?;
            rounds += 1;
        }
        if !self.redraw.is_empty() {
            self.redraw()?;
        }
        Ok(())
    }
}

/// Sends one hash of the `REFRESH` loop and reads the node if it exists.
fn query(wire: &mut TcpWire, hash: NodeHash) -> Result<Option<LayoutNode>> {
    wire.write_u64(hash)?;
    wire.flush()?;
    if !wire.read_bool()? {
        return Ok(None);
    }
    Ok(Some(wire.read_blob()?))
}

fn exchange(wire: &mut TcpWire, rects: &RectsMsg) -> Result<Buffers> {
    wire.write_blob(rects)?;
    wire.flush()?;
    wire.read_blob()
}
