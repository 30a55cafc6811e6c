use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use std::io::{self, Stdout, Write};
use unicode_width::UnicodeWidthStr;

use crate::game::{Game, Status};
use crate::maze::{Cell, Pos};

const CELL_W: usize = 2;

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Player,
    Lurker,
    Wall,
    Path,
    Exit,
    Item,
    Trap,
    MonsterDen,
    Portal,
    Fog,
    Hidden,
}

#[derive(Clone, Copy, PartialEq)]
struct Tile {
    glyph: Glyph,
    color: Color,
}

pub struct Renderer {
    last: Vec<Tile>,
    last_hud: String,
    last_banner: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            last: vec![
                Tile {
                    glyph: Glyph::Path,
                    color: Color::Reset,
                };
                width * height
            ],
            last_hud: String::new(),
            last_banner: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }
}

pub fn render(
    stdout: &mut Stdout,
    game: &Game,
    renderer: &mut Renderer,
    level_id: u32,
) -> io::Result<()> {
    let needed_h = (game.height() + 3) as u16;
    let needed_w = (game.width() * CELL_W) as u16;

    stdout.queue(MoveTo(0, 0))?;

    let (term_w, term_h) = terminal::size()?;
    if term_w < needed_w || term_h < needed_h {
        stdout.queue(Clear(ClearType::All))?;
        let msg = format!(
            "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
            needed_w, needed_h, term_w, term_h
        );
        stdout.queue(Print(msg))?;
        stdout.flush()?;
        renderer.needs_full = true;
        return Ok(());
    }

    let origin_x = (term_w - needed_w) / 2;
    let origin_y = (term_h - needed_h) / 2 + 1;
    if origin_x != renderer.origin_x || origin_y != renderer.origin_y {
        renderer.origin_x = origin_x;
        renderer.origin_y = origin_y;
        renderer.needs_full = true;
    }

    let hud = hud_line(game, level_id);
    if renderer.needs_full || hud != renderer.last_hud {
        stdout.queue(MoveTo(renderer.origin_x, renderer.origin_y - 1))?;
        stdout.queue(SetForegroundColor(Color::White))?;
        stdout.queue(Clear(ClearType::CurrentLine))?;
        stdout.queue(Print(&hud))?;
        stdout.queue(ResetColor)?;
        renderer.last_hud = hud;
    }

    for row in 0..game.height() {
        for col in 0..game.width() {
            let pos = Pos { row, col };
            let tile = tile_for(game, pos);
            let idx = row * game.width() + col;
            if renderer.needs_full || tile != renderer.last[idx] {
                renderer.last[idx] = tile;
                draw_tile(stdout, renderer, pos, tile)?;
            }
        }
    }

    let (banner, banner_color) = banner_line(game);
    if renderer.needs_full || banner != renderer.last_banner {
        stdout.queue(MoveTo(
            renderer.origin_x,
            renderer.origin_y + game.height() as u16,
        ))?;
        stdout.queue(Clear(ClearType::CurrentLine))?;
        stdout.queue(SetForegroundColor(banner_color))?;
        stdout.queue(Print(&banner))?;
        stdout.queue(ResetColor)?;
        renderer.last_banner = banner;
    }
    renderer.needs_full = false;

    stdout.flush()?;
    Ok(())
}

fn hud_line(game: &Game, level_id: u32) -> String {
    let mut hud = format!("Level: {}  Time: {}s", level_id, game.time_left);
    if game.config.items_required > 0 {
        hud.push_str(&format!(
            "  Items: {}/{}",
            game.items, game.config.items_required
        ));
    }
    if !game.monsters.is_empty() {
        hud.push_str(&format!("  Monsters: {}", game.monsters.len()));
    }
    hud.push_str("  (1-5 level, r restart, q quit)");
    hud
}

fn banner_line(game: &Game) -> (String, Color) {
    match game.status {
        Status::Won => ("You won! Pick a level (1-5) or press r.".to_string(), Color::Green),
        Status::Lost => ("Game over! Pick a level (1-5) or press r.".to_string(), Color::Red),
        Status::Playing => ("Arrows/hjkl to move.".to_string(), Color::DarkGrey),
    }
}

/// Mirrors the presentation rules: fog masking first, then the player
/// highlight, then roaming monsters, then the cell's own tag.
fn tile_for(game: &Game, pos: Pos) -> Tile {
    if !game.is_visible(pos) {
        return Tile {
            glyph: Glyph::Hidden,
            color: Color::DarkGrey,
        };
    }
    if pos == game.player {
        return Tile {
            glyph: Glyph::Player,
            color: Color::Blue,
        };
    }
    if game.monsters.iter().any(|m| *m == pos) {
        return Tile {
            glyph: Glyph::Lurker,
            color: Color::Magenta,
        };
    }
    match game.grid[pos.row][pos.col] {
        Cell::Wall => Tile {
            glyph: Glyph::Wall,
            color: Color::DarkBlue,
        },
        Cell::Path => Tile {
            glyph: Glyph::Path,
            color: Color::Reset,
        },
        Cell::Exit => Tile {
            glyph: Glyph::Exit,
            color: Color::Green,
        },
        Cell::Item => Tile {
            glyph: Glyph::Item,
            color: Color::Yellow,
        },
        Cell::Trap => Tile {
            glyph: Glyph::Trap,
            color: Color::Red,
        },
        Cell::Monster => Tile {
            glyph: Glyph::MonsterDen,
            color: Color::Magenta,
        },
        Cell::Portal => Tile {
            glyph: Glyph::Portal,
            color: Color::Cyan,
        },
        Cell::Fog => Tile {
            glyph: Glyph::Fog,
            color: Color::Grey,
        },
    }
}

fn draw_tile(stdout: &mut Stdout, renderer: &Renderer, pos: Pos, tile: Tile) -> io::Result<()> {
    let (text, color) = match tile.glyph {
        Glyph::Player => ("🧍", tile.color),
        Glyph::Lurker => ("👹", tile.color),
        Glyph::Wall => ("██", tile.color),
        Glyph::Path => ("  ", tile.color),
        Glyph::Exit => ("🚪", tile.color),
        Glyph::Item => ("⭐", tile.color),
        Glyph::Trap => ("🔥", tile.color),
        Glyph::MonsterDen => ("👻", tile.color),
        Glyph::Portal => ("🌀", tile.color),
        Glyph::Fog => ("░░", tile.color),
        Glyph::Hidden => ("▒▒", tile.color),
    };
    let x_pos = renderer.origin_x + (pos.col * CELL_W) as u16;
    let y_pos = renderer.origin_y + pos.row as u16;
    stdout.queue(MoveTo(x_pos, y_pos))?;
    stdout.queue(SetForegroundColor(color))?;
    stdout.queue(Print(text))?;
    let w = UnicodeWidthStr::width(text);
    if w < CELL_W {
        for _ in 0..(CELL_W - w) {
            stdout.queue(Print(' '))?;
        }
    }
    stdout.queue(ResetColor)?;
    Ok(())
}
