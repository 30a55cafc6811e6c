use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use std::io::{self, Stdout};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

mod game;
mod levels;
mod maze;
mod render;

use game::{Dir, Status};
use render::Renderer;

const DEFAULT_RENDER_FPS: u64 = 60;

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Generation(#[from] maze::GenerationError),
}

fn main() -> Result<(), AppError> {
    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn run(stdout: &mut Stdout) -> Result<(), AppError> {
    let mut rng = rand::thread_rng();
    let mut level_id = 1;
    let mut game = start_level(level_id, &mut rng)?;
    let mut renderer = Renderer::new(game.width(), game.height());
    let mut last_tick = Instant::now();
    let render_fps = read_speed_settings();
    let frame_time = Duration::from_micros(1_000_000 / render_fps.max(1));

    loop {
        let frame_start = Instant::now();
        let mut switch_to = None;
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                match key.kind {
                    KeyEventKind::Press | KeyEventKind::Repeat => match key.code {
                        KeyCode::Char('q') => return Ok(()),
                        KeyCode::Char('r') => switch_to = Some(level_id),
                        KeyCode::Char(c @ '1'..='5') => {
                            switch_to = Some(c as u32 - '0' as u32);
                        }
                        KeyCode::Up | KeyCode::Char('k') => game.apply_move(Dir::Up, &mut rng),
                        KeyCode::Down | KeyCode::Char('j') => game.apply_move(Dir::Down, &mut rng),
                        KeyCode::Left | KeyCode::Char('h') => game.apply_move(Dir::Left, &mut rng),
                        KeyCode::Right | KeyCode::Char('l') => {
                            game.apply_move(Dir::Right, &mut rng)
                        }
                        _ => {}
                    },
                    _ => {}
                }
            }
        }

        if let Some(id) = switch_to {
            // The old session is replaced wholesale; the countdown baseline
            // restarts with it.
            level_id = id;
            game = start_level(level_id, &mut rng)?;
            renderer = Renderer::new(game.width(), game.height());
            last_tick = Instant::now();
        }

        if game.status == Status::Playing && last_tick.elapsed() >= Duration::from_secs(1) {
            last_tick = Instant::now();
            game.tick();
        }

        render::render(stdout, &game, &mut renderer, level_id)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

fn start_level(level_id: u32, rng: &mut impl rand::Rng) -> Result<game::Game, AppError> {
    let config = levels::level_config(level_id).expect("level keys map to table entries");
    Ok(game::new_game(config, rng)?)
}

fn read_speed_settings() -> u64 {
    std::env::var("MAZE_FPS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_RENDER_FPS)
}
