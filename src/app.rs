use crate::input::{collect_input_nonblocking, TankInput};
use crate::screen::{draw_text, draw_text_clipped, Cell, Terminal};
use chrono::{DateTime, Local};
use crossterm::style::Color;
use fishtank::config::Settings;
use fishtank::{
    spawn_poller, Drawable, FishId, FishRecord, HoverRegistry, Poller, SnapshotSource, StaticHost,
    TankController,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cmp::{max, min};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::info;

const WATER: Color = Color::AnsiValue(17);
const PANEL: Color = Color::AnsiValue(16);
const HOVER_BG: Color = Color::AnsiValue(24);
const SELECT_BG: Color = Color::AnsiValue(238);
const HUD: Color = Color::AnsiValue(159);
const NAMETAG: Color = Color::AnsiValue(230);

// hue of the undyed sprite, before the per-fish rotation
const BASE_HUE: f32 = 30.0;

// at most this many ticks are replayed after a stalled frame
const MAX_CATCHUP_TICKS: u32 = 10;

// title row plus one row per status line, plus a spare row
const STATUS_BOX_H: u16 = 6;

// (facing right, facing left) by size class
const SPRITES: [(&str, &str); 3] = [
    ("><>", "<><"),
    ("><(((>", "<)))><"),
    ("><((((('>", "<')))))><"),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Layout {
    panel_w: u16,
    tank_x: u16,
    tank_w: u16,
    tank_h: u16,
}

impl Layout {
    fn new(cols: u16, rows: u16) -> Self {
        let panel_w = min(max(24, cols / 4), cols.saturating_sub(10));
        let tank_x = min(panel_w + 1, cols);
        Self {
            panel_w,
            tank_x,
            tank_w: cols - tank_x,
            tank_h: rows.saturating_sub(1),
        }
    }

    /// First panel row past the fish list. The status box sits below it
    /// when the panel is tall enough.
    fn list_end(&self) -> u16 {
        if self.tank_h >= 2 + STATUS_BOX_H + 3 {
            self.tank_h - STATUS_BOX_H
        } else {
            self.tank_h
        }
    }

    fn has_status_box(&self) -> bool {
        self.list_end() < self.tank_h
    }

    /// Roster index drawn on panel row `row`, if that row is a list row.
    fn list_index(&self, row: u16) -> Option<usize> {
        (2..self.list_end()).contains(&row).then(|| (row - 2) as usize)
    }

    fn lane_row(&self, lane_pct: u8) -> u16 {
        let h = self.tank_h.saturating_sub(1) as u32;
        (lane_pct.min(100) as u32 * h / 100) as u16
    }
}

fn sprite(d: &Drawable) -> &'static str {
    let class = if d.scale < 0.35 {
        0
    } else if d.scale < 0.7 {
        1
    } else {
        2
    };
    let (right, left) = SPRITES[class];
    if d.mirrored {
        left
    } else {
        right
    }
}

fn fish_status_lines(fish: Option<&FishRecord>) -> Vec<String> {
    let Some(fish) = fish else {
        return vec!["point at a fish or".into(), "select a row".into()];
    };
    let age = fish
        .age
        .map(|s| format!("{s} seconds"))
        .unwrap_or_else(|| "unknown".into());
    let fed = fish
        .seconds_since_fed
        .map(|s| format!("{s}s ago"))
        .unwrap_or_else(|| "unknown".into());
    vec![
        format!("Name      {}", fish.name),
        format!("Age       {age}"),
        format!("Last fed  {fed}"),
        format!("State     {}", if fish.dead { "dead" } else { "alive" }),
    ]
}

fn hue_color(hue_deg: f32, value: f32) -> Color {
    let h = hue_deg.rem_euclid(360.0) / 60.0;
    let s = 0.8;
    let v = value.clamp(0.0, 1.0);
    let c = v * s;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = v - c;
    let to8 = |f: f32| ((f + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Color::Rgb {
        r: to8(r),
        g: to8(g),
        b: to8(b),
    }
}

fn fish_color(colour_hue: u16, opacity: f32) -> Color {
    hue_color(BASE_HUE + colour_hue as f32, 0.35 + 0.65 * opacity)
}

pub(crate) struct App {
    settings: Settings,
    tank: TankController<StdRng>,
    hover: HoverRegistry,
    roster: Vec<FishRecord>,
    selected: Option<usize>,
    visible: bool,
    layout: Layout,
    term: Terminal,
    snapshots: mpsc::Receiver<Vec<FishRecord>>,
    poller: Option<Poller>,
    last_snapshot_at: Option<DateTime<Local>>,
    show_help: bool,
    should_quit: bool,
}

impl App {
    fn init<S: SnapshotSource>(settings: Settings, source: S) -> anyhow::Result<Self> {
        let seed = settings.seed.unwrap_or_else(rand::random);
        info!(seed, "starting fish tank");

        let term = Terminal::begin()?;
        let layout = Layout::new(term.cols, term.rows);
        let hover = HoverRegistry::new();
        let tank = TankController::new(
            settings.rules.clone(),
            layout.tank_w as u32 * settings.px_per_col,
            hover.clone(),
            StdRng::seed_from_u64(seed),
        );

        let (tx, snapshots) = mpsc::channel(4);
        let poller = spawn_poller(source, tx, settings.poller());

        Ok(Self {
            settings,
            tank,
            hover,
            roster: Vec::new(),
            selected: None,
            visible: true,
            layout,
            term,
            snapshots,
            poller: Some(poller),
            last_snapshot_at: None,
            show_help: false,
            should_quit: false,
        })
    }

    fn viewport_px(&self) -> u32 {
        self.layout.tank_w as u32 * self.settings.px_per_col
    }

    fn host(&self) -> StaticHost {
        StaticHost {
            visible: self.visible,
            width: self.viewport_px(),
        }
    }

    fn highlighted(&self) -> Option<FishId> {
        self.selected
            .and_then(|i| self.roster.get(i))
            .map(|r| r.id)
    }

    async fn run(&mut self) -> anyhow::Result<()> {
        let frame_dt = Duration::from_millis(self.settings.frame_ms.clamp(5, 250));
        let tick_step = Duration::from_millis(self.tank.rules().tick_ms);
        let mut frame = time::interval(frame_dt);
        frame.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut last = Instant::now();
        let mut accum = Duration::ZERO;

        while !self.should_quit {
            frame.tick().await;

            for input in collect_input_nonblocking()? {
                self.handle_input(input);
            }

            while let Ok(snapshot) = self.snapshots.try_recv() {
                self.on_snapshot(snapshot);
            }

            let now = Instant::now();
            accum = accum
                .saturating_add(now.saturating_duration_since(last))
                .min(tick_step * MAX_CATCHUP_TICKS);
            last = now;

            let host = self.host();
            while accum >= tick_step {
                self.tank.tick(&host);
                accum -= tick_step;
            }

            self.render_frame()?;
        }
        Ok(())
    }

    fn shutdown(&mut self) -> anyhow::Result<()> {
        if let Some(poller) = self.poller.take() {
            poller.shutdown();
        }
        self.snapshots.close();
        self.term.end()?;
        info!(
            ticks = self.tank.engine().ticks(),
            in_tank = self.tank.membership().len(),
            "fish tank closed"
        );
        Ok(())
    }

    fn on_snapshot(&mut self, snapshot: Vec<FishRecord>) {
        self.tank.apply_deaths(&snapshot);
        self.tank.reconcile(&snapshot);
        self.roster = snapshot;
        self.last_snapshot_at = Some(Local::now());
        if let Some(i) = self.selected {
            if i >= self.roster.len() {
                self.selected = self.roster.len().checked_sub(1);
            }
        }
    }

    fn handle_input(&mut self, input: TankInput) {
        match input {
            TankInput::Quit => self.should_quit = true,
            TankInput::ToggleHelp => self.show_help = !self.show_help,
            TankInput::Redraw => self.term.force_redraw(),
            TankInput::Resize(cols, rows) => {
                self.term.resize(cols, rows);
                self.layout = Layout::new(cols, rows);
                let width = self.viewport_px();
                self.tank.resize(width);
            }
            TankInput::Focus(visible) => {
                self.visible = visible;
                info!(visible, "visibility changed");
            }
            TankInput::Pointer(col, row) => {
                let target = self.fish_at(col, row);
                self.hover.set_hover(target);
            }
            TankInput::SelectPrev => {
                self.selected = match self.selected {
                    _ if self.roster.is_empty() => None,
                    None | Some(0) => Some(self.roster.len() - 1),
                    Some(i) => Some(i - 1),
                };
            }
            TankInput::SelectNext => {
                self.selected = match self.selected {
                    _ if self.roster.is_empty() => None,
                    None => Some(0),
                    Some(i) => Some((i + 1) % self.roster.len()),
                };
            }
            TankInput::ClearSelection => self.selected = None,
        }
    }

    /// Fish under a screen cell, from either the list or the tank.
    fn fish_at(&self, col: u16, row: u16) -> Option<FishId> {
        let l = self.layout;
        if col < l.panel_w {
            let ix = l.list_index(row)?;
            return self.roster.get(ix).map(|r| r.id);
        }
        if col < l.tank_x || row >= l.tank_h {
            return None;
        }
        let px = self.settings.px_per_col.max(1) as f64;
        // last drawn sits on top
        self.tank
            .drawables(None)
            .iter()
            .rev()
            .find(|d| {
                let start = l.tank_x as i32 + (d.x / px).floor() as i32;
                let len = sprite(d).chars().count() as i32;
                l.lane_row(d.lane_pct) == row && (start..start + len).contains(&(col as i32))
            })
            .map(|d| d.fish_id)
    }

    fn render_frame(&mut self) -> anyhow::Result<()> {
        let l = self.layout;
        let cols = self.term.cols;
        let hovered = self.hover.current_hover();
        let highlighted = self.highlighted();
        let buf = &mut self.term.cur;
        buf.clear(PANEL);
        buf.fill(l.tank_x, 0, l.tank_w, l.tank_h, WATER);

        // side list
        draw_text(
            buf,
            1,
            0,
            &format!("Fish ({})", self.roster.len()),
            HUD,
            PANEL,
        );
        let name_w = l.panel_w.saturating_sub(12) as usize;
        for (i, fish) in self.roster.iter().enumerate() {
            let y = 2 + i as u16;
            if y >= l.list_end() {
                break;
            }
            let marker = if fish.dead {
                'x'
            } else if self.tank.membership().contains(fish.id) {
                '~'
            } else {
                ' '
            };
            let bg = if hovered == Some(fish.id) {
                HOVER_BG
            } else if highlighted == Some(fish.id) {
                SELECT_BG
            } else {
                PANEL
            };
            let name: String = fish.name.chars().take(name_w).collect();
            let line = format!(
                "{marker} {name:<name_w$} {:>7}",
                fish.id.to_string(),
                name_w = name_w
            );
            buf.fill(0, y, l.panel_w, 1, bg);
            draw_text(buf, 1, y, &line, fish_color(fish.colour_hue, 1.0), bg);
        }
        if l.has_status_box() && l.panel_w > 2 {
            let y0 = l.list_end();
            let focus = hovered
                .or(highlighted)
                .and_then(|id| self.roster.iter().find(|r| r.id == id));
            let text_w = l.panel_w.saturating_sub(2) as usize;
            draw_text(buf, 0, y0, &"─".repeat(l.panel_w as usize), HUD, PANEL);
            draw_text(buf, 1, y0, " Fish status ", HUD, PANEL);
            for (i, line) in fish_status_lines(focus).iter().enumerate() {
                let text: String = line.chars().take(text_w).collect();
                draw_text(buf, 1, y0 + 1 + i as u16, &text, NAMETAG, PANEL);
            }
        }
        if l.tank_x > 0 {
            for y in 0..l.tank_h {
                draw_text(buf, l.tank_x - 1, y, "│", HUD, PANEL);
            }
        }

        // tank
        let px = self.settings.px_per_col.max(1) as f64;
        for d in self.tank.drawables(highlighted) {
            let col = l.tank_x as i32 + (d.x / px).floor() as i32;
            let row = l.lane_row(d.lane_pct);
            let color = fish_color(d.hue_rotate_deg, d.opacity);
            draw_text_clipped(buf, col, row, cols, sprite(&d), color, false);
            if d.show_nametag && row > 0 {
                let tag = format!(" {} ", d.name);
                let tag_col = max(col, l.tank_x as i32);
                draw_text_clipped(buf, tag_col, row - 1, cols, &tag, NAMETAG, true);
            }
        }

        self.draw_status()?;
        if self.show_help {
            self.draw_help();
        }
        self.term.present()
    }

    fn draw_status(&mut self) -> anyhow::Result<()> {
        let rows = self.term.rows;
        if rows == 0 {
            return Ok(());
        }
        let last = self
            .last_snapshot_at
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "never".to_string());
        let line = format!(
            " fishtank | in tank {} | known {} | last snapshot {} | {} | ? help  q quit ",
            self.tank.membership().len(),
            self.roster.len(),
            last,
            if self.visible { "swimming" } else { "paused (unfocused)" },
        );
        let y = rows - 1;
        let w = self.term.cols;
        let buf = &mut self.term.cur;
        for x in 0..w {
            buf.set(x, y, Cell::blank(PANEL));
        }
        draw_text(buf, 0, y, &line, HUD, PANEL);
        Ok(())
    }

    fn draw_help(&mut self) {
        let lines = [
            "Fish tank",
            "",
            "Fish from the latest snapshot enter one at a time.",
            "Point at a fish (or its row) to hold it and see its name.",
            "",
            "Up/Down   select a row to tag that fish",
            "Backspace clear selection",
            "Ctrl-L    redraw",
            "?         close help",
            "q / Esc   quit",
        ];
        let w = self.term.cols;
        let h = self.term.rows;
        let bw = min(64, w.saturating_sub(4));
        let bh = min(lines.len() as u16 + 2, h.saturating_sub(2));
        if bw < 10 || bh < 3 {
            return;
        }
        let x0 = (w - bw) / 2;
        let y0 = (h - bh) / 2;
        let buf = &mut self.term.cur;
        buf.fill(x0, y0, bw, bh, PANEL);
        for (i, line) in lines.iter().enumerate() {
            let y = y0 + 1 + i as u16;
            if y >= y0 + bh - 1 {
                break;
            }
            let text: String = line.chars().take(bw as usize - 4).collect();
            draw_text(buf, x0 + 2, y, &text, HUD, PANEL);
        }
    }
}

pub(crate) async fn run<S: SnapshotSource>(settings: Settings, source: S) -> anyhow::Result<()> {
    let mut app = App::init(settings, source)?;
    let res = app.run().await;
    app.shutdown()?;
    res
}
