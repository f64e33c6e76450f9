//! smidja-preview: terminal inspector for assistant replies.
//!
//! Reads an assistant reply (`{ "message": .., "tasks": [..] }`), applies it
//! to a fresh scene root and shows the result in a ratatui dashboard: the
//! node tree, the selected node's state and the log stream of the batch.
//!
//! ```text
//! smidja-preview reply.json --texture res://assets/knight.png=64x64
//! smidja-preview reply.json --project ./my_game --print
//! ```

mod capture;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use smidja::prelude::*;

use capture::CapturedLog;

// ── Command line ─────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "smidja-preview", about = "Apply an assistant reply and inspect the scene tree")]
struct Args {
    /// Assistant reply JSON file.
    reply: PathBuf,

    /// Project directory that `res://` texture paths resolve against.
    #[arg(long)]
    project: Option<PathBuf>,

    /// Declare an in-memory texture, e.g. `res://knight.png=64x64`. Repeatable.
    #[arg(long = "texture", value_name = "PATH=WxH")]
    textures: Vec<String>,

    /// Assembler config JSON file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Name of the scene root.
    #[arg(long, default_value = "Main")]
    root_name: String,

    /// Type of the scene root.
    #[arg(long, default_value = "Node2D")]
    root_type: String,

    /// Print the tree and the report to stdout instead of opening the TUI.
    #[arg(long)]
    print: bool,
}

fn parse_texture(arg: &str) -> anyhow::Result<(&str, u32, u32)> {
    let (path, size) = arg
        .rsplit_once('=')
        .with_context(|| format!("texture '{arg}' is not PATH=WxH"))?;
    let (w, h) = size
        .split_once(['x', 'X'])
        .with_context(|| format!("texture size '{size}' is not WxH"))?;
    Ok((path, w.trim().parse()?, h.trim().parse()?))
}

fn loader(args: &Args) -> anyhow::Result<Box<dyn ResourceLoader>> {
    if let Some(project) = &args.project {
        #[cfg(feature = "fs-loader")]
        {
            if !args.textures.is_empty() {
                log::warn!("--texture is ignored when --project is given");
            }
            return Ok(Box::new(TextureCache::new(ImageLoader::new(project))));
        }
        #[cfg(not(feature = "fs-loader"))]
        bail!(
            "--project {} needs the fs-loader feature",
            project.display()
        );
    }

    let mut memory = MemoryLoader::new();
    for arg in &args.textures {
        let (path, w, h) = parse_texture(arg)?;
        memory.insert(path, w, h);
    }
    Ok(Box::new(memory))
}

// ── Batch ────────────────────────────────────────────────────────────────

struct Applied {
    message: String,
    tree: SceneTree,
    report: BatchReport,
}

fn apply(args: &Args) -> anyhow::Result<Applied> {
    let json = std::fs::read_to_string(&args.reply)
        .with_context(|| format!("reading {}", args.reply.display()))?;
    let reply = AssistantReply::from_json_str(&json)
        .with_context(|| format!("parsing {}", args.reply.display()))?;

    let config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            AssemblerConfig::from_json_str(&text)?
        }
        None => AssemblerConfig::default(),
    };

    let mut assembler = SceneAssembler::new(loader(args)?).with_config(config);
    let root = match assembler.registry().instantiate(&args.root_type, &args.root_name) {
        Ok(root) => root,
        Err(e) => bail!("cannot create the scene root: {e}"),
    };
    let mut tree = SceneTree::new(root);
    let report = assembler.apply_reply(&mut tree, &reply);

    Ok(Applied {
        message: reply.message,
        tree,
        report,
    })
}

fn print_report(applied: &Applied) {
    if !applied.message.is_empty() {
        println!("{}\n", applied.message);
    }
    print!("{}", applied.tree.dump());
    println!();
    for (i, outcome) in applied.report.outcomes.iter().enumerate() {
        println!("#{i:<3} {outcome}");
        if outcome.is_applied() {
            for warning in outcome.errors() {
                println!("       warning: {warning}");
            }
        }
    }
    println!("\n{}", applied.report);
}

// ── App ──────────────────────────────────────────────────────────────────

struct Row {
    id: NodeId,
    depth: usize,
}

struct App {
    applied: Applied,
    rows: Vec<Row>,
    /// Index into `rows`.
    cursor: usize,
    logs: Vec<CapturedLog>,
    log_auto_scroll: bool,
    log_scroll_offset: usize,
}

impl App {
    fn new(applied: Applied) -> Self {
        let mut rows = Vec::new();
        collect_rows(&applied.tree, applied.tree.root(), 0, &mut rows);
        Self {
            applied,
            rows,
            cursor: 0,
            logs: capture::snapshot(),
            log_auto_scroll: true,
            log_scroll_offset: 0,
        }
    }

    fn selected(&self) -> Option<&Node> {
        let row = self.rows.get(self.cursor)?;
        self.applied.tree.get(row.id)
    }
}

fn collect_rows(tree: &SceneTree, id: NodeId, depth: usize, rows: &mut Vec<Row>) {
    rows.push(Row { id, depth });
    for &child in tree.children(id) {
        collect_rows(tree, child, depth + 1, rows);
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    capture::init(args.print);

    let applied = apply(&args)?;
    if args.print {
        print_report(&applied);
        return Ok(());
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(applied);
    let result = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> anyhow::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if handle_key(app, key) {
                    return Ok(());
                }
            }
        }
    }
}

// ── Key handling ─────────────────────────────────────────────────────────

/// Returns `true` if the app should quit.
fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
        KeyCode::Up | KeyCode::Char('k') => app.cursor = app.cursor.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => {
            if app.cursor + 1 < app.rows.len() {
                app.cursor += 1;
            }
        }
        KeyCode::Home => app.cursor = 0,
        KeyCode::End => app.cursor = app.rows.len().saturating_sub(1),
        KeyCode::PageUp => {
            if app.log_auto_scroll {
                app.log_auto_scroll = false;
                app.log_scroll_offset = app.logs.len();
            }
            app.log_scroll_offset = app.log_scroll_offset.saturating_sub(10);
        }
        KeyCode::PageDown => {
            app.log_scroll_offset += 10;
            if app.log_scroll_offset >= app.logs.len() {
                app.log_auto_scroll = true;
            }
        }
        _ => {}
    }
    false
}

// ── Drawing ──────────────────────────────────────────────────────────────

fn ui(f: &mut ratatui::Frame, app: &App) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(10),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, app, outer[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(outer[1]);
    draw_tree(f, app, body[0]);
    draw_details(f, app, body[1]);

    draw_logs(f, app, outer[2]);
    draw_help_bar(f, outer[3]);
}

fn draw_header(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let report = &app.applied.report;
    let status_color = if report.is_clean() {
        Color::Green
    } else if report.skipped() > 0 {
        Color::Red
    } else {
        Color::Yellow
    };

    let line = Line::from(vec![
        Span::styled(
            " smidja ",
            Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(format!("{report}"), Style::default().fg(status_color)),
        Span::raw("  |  "),
        Span::styled(
            format!("{} nodes", app.applied.tree.len()),
            Style::default().fg(Color::White),
        ),
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    f.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_tree(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Scene ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let visible = inner.height as usize;
    let offset = app.cursor.saturating_sub(visible.saturating_sub(1));
    let tree = &app.applied.tree;

    let lines: Vec<Line> = app
        .rows
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(i, row)| {
            let node = &tree[row.id];
            let selected = i == app.cursor;
            let name_style = if selected {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default().fg(Color::White)
            };
            let mut spans = vec![
                Span::raw(format!(" {}", "  ".repeat(row.depth))),
                Span::styled(node.name().to_string(), name_style),
                Span::styled(format!(" ({})", node.type_name()), Style::default().fg(Color::DarkGray)),
            ];
            if node.behavior().is_some() {
                spans.push(Span::styled(" [script]", Style::default().fg(Color::Magenta)));
            }
            Line::from(spans)
        })
        .collect();

    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_details(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let Some(node) = app.selected() else {
        f.render_widget(Block::default().title(" Node ").borders(Borders::ALL), area);
        return;
    };

    let block = Block::default()
        .title(format!(" {} ", app.applied.tree.path_of(app.rows[app.cursor].id)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let text = match serde_json::to_string_pretty(node) {
        Ok(json) => json,
        Err(e) => format!("cannot display node: {e}"),
    };
    let lines: Vec<Line> = text
        .lines()
        .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(Color::White))))
        .collect();
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_logs(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let warnings = app.logs.iter().filter(|l| l.level <= log::Level::Warn).count();
    let scroll_label = if app.log_auto_scroll { "auto" } else { "manual" };
    let block = Block::default()
        .title(format!(" Log  {} entries, {} warnings  scroll:{} ", app.logs.len(), warnings, scroll_label))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if app.logs.is_empty() {
        let text = Span::styled("  No log messages", Style::default().fg(Color::DarkGray));
        f.render_widget(Paragraph::new(text), inner);
        return;
    }

    let visible = inner.height as usize;
    let total = app.logs.len();
    let offset = if app.log_auto_scroll {
        total.saturating_sub(visible)
    } else {
        app.log_scroll_offset.min(total.saturating_sub(visible))
    };

    let lines: Vec<Line> = app
        .logs
        .iter()
        .skip(offset)
        .take(visible)
        .map(|entry| {
            let level_color = match entry.level {
                log::Level::Trace => Color::DarkGray,
                log::Level::Debug => Color::Gray,
                log::Level::Info => Color::Cyan,
                log::Level::Warn => Color::Yellow,
                log::Level::Error => Color::Red,
            };
            Line::from(vec![
                Span::styled(
                    format!("  [{:>6.3}s] ", entry.timestamp_secs),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    format!("{:<5} ", entry.level),
                    Style::default().fg(level_color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("{}: ", entry.target), Style::default().fg(Color::DarkGray)),
                Span::styled(entry.message.clone(), Style::default().fg(Color::White)),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_help_bar(f: &mut ratatui::Frame, area: Rect) {
    let key = Style::default().fg(Color::Cyan);
    let line = Line::from(vec![
        Span::styled(" [\u{2191}\u{2193}/jk]", key),
        Span::raw(" select  "),
        Span::styled("[Home/End]", key),
        Span::raw(" first/last  "),
        Span::styled("[PgUp/PgDn]", key),
        Span::raw(" scroll log  "),
        Span::styled("[q]", key),
        Span::raw(" quit"),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_specs_parse() {
        assert_eq!(
            parse_texture("res://assets/knight.png=64x32").unwrap(),
            ("res://assets/knight.png", 64, 32)
        );
        assert!(parse_texture("res://knight.png").is_err());
        assert!(parse_texture("res://knight.png=64").is_err());
        assert!(parse_texture("res://knight.png=ax2").is_err());
    }

    #[test]
    fn rows_follow_tree_order_with_depth() {
        let mut tree = SceneTree::new(Node::new("Main", "Node2D", NodeKind::Spatial));
        let root = tree.root();
        let game = tree.add_child(root, Node::new("Game", "Node2D", NodeKind::Spatial)).unwrap();
        tree.add_child(game, Node::new("Hero", "Node2D", NodeKind::Spatial)).unwrap();
        tree.add_child(root, Node::new("Cam", "Camera2D", NodeKind::Camera)).unwrap();

        let mut rows = Vec::new();
        collect_rows(&tree, root, 0, &mut rows);

        let shape: Vec<(&str, usize)> = rows.iter().map(|r| (tree[r.id].name(), r.depth)).collect();
        assert_eq!(shape, vec![("Main", 0), ("Game", 1), ("Hero", 2), ("Cam", 1)]);
    }
}
