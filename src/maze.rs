use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::game::Dir;
use crate::levels::LevelConfig;

/// Rejection-sampling attempt budget per placed cell, scaled by grid area.
/// Placement draws uniformly over the whole grid, so the expected number of
/// tries per hit is `area / path_cells`; the factor leaves generous headroom
/// before we give up and report the config as unsatisfiable.
const SAMPLE_ATTEMPT_FACTOR: usize = 100;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cell {
    Wall,
    Path,
    Exit,
    Item,
    Trap,
    Monster,
    Portal,
    Fog,
}

pub type Grid = Vec<Vec<Cell>>;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("no free path cell found after {attempts} draws while placing {wanted:?}; level config requests more special cells than the maze can hold")]
    PlacementExhausted { wanted: Cell, attempts: usize },
}

/// Build the maze for one level: carve a perfect maze from (1,1), force the
/// exit into the far corner, then scatter the level's special cells over the
/// carved paths. Placement order is items, monsters, traps, portals, fog;
/// each pass only overwrites cells still tagged `Path`, so earlier passes
/// shrink the pool the later ones draw from.
pub fn generate(config: &LevelConfig, rng: &mut impl Rng) -> Result<Grid, GenerationError> {
    let (width, height) = (config.width, config.height);
    let mut grid = vec![vec![Cell::Wall; width]; height];

    grid[1][1] = Cell::Path;
    carve(&mut grid, Pos { row: 1, col: 1 }, rng);

    // The exit overrides whatever the carve left in that corner.
    grid[height - 2][width - 2] = Cell::Exit;

    place_random(&mut grid, Cell::Item, config.items_required as usize, rng)?;
    place_random(&mut grid, Cell::Monster, config.monsters, rng)?;
    place_random(&mut grid, Cell::Trap, config.traps, rng)?;
    place_random(&mut grid, Cell::Portal, config.portals, rng)?;

    let fog_cells = width * height * config.fog_percentage as usize / 100;
    place_random(&mut grid, Cell::Fog, fog_cells, rng)?;

    Ok(grid)
}

/// Randomized depth-first backtracker over 2-step neighbors. Runs on an
/// explicit stack so large grids cannot blow the call stack.
fn carve(grid: &mut Grid, start: Pos, rng: &mut impl Rng) {
    let height = grid.len() as isize;
    let width = grid[0].len() as isize;
    let mut stack = vec![start];

    while let Some(&pos) = stack.last() {
        let mut dirs = [Dir::Up, Dir::Down, Dir::Left, Dir::Right];
        dirs.shuffle(rng);

        let mut advanced = false;
        for dir in dirs {
            let (dr, dc) = dir.delta();
            let nr = pos.row as isize + dr * 2;
            let nc = pos.col as isize + dc * 2;
            if nr < 0 || nr >= height || nc < 0 || nc >= width {
                continue;
            }
            if grid[nr as usize][nc as usize] != Cell::Wall {
                continue;
            }
            let mid_r = (pos.row as isize + dr) as usize;
            let mid_c = (pos.col as isize + dc) as usize;
            grid[mid_r][mid_c] = Cell::Path;
            grid[nr as usize][nc as usize] = Cell::Path;
            stack.push(Pos {
                row: nr as usize,
                col: nc as usize,
            });
            advanced = true;
            break;
        }
        if !advanced {
            stack.pop();
        }
    }
}

fn place_random(
    grid: &mut Grid,
    tag: Cell,
    count: usize,
    rng: &mut impl Rng,
) -> Result<(), GenerationError> {
    for _ in 0..count {
        let pos = sample_path(grid, tag, rng)?;
        grid[pos.row][pos.col] = tag;
    }
    Ok(())
}

/// Uniform rejection sampling over the whole grid until a `Path` cell comes
/// up. Never lands on a wall or any special tag. Used for special-cell
/// placement and to seed player, monster, and portal start positions.
pub fn random_path_position(grid: &Grid, rng: &mut impl Rng) -> Result<Pos, GenerationError> {
    sample_path(grid, Cell::Path, rng)
}

fn sample_path(grid: &Grid, wanted: Cell, rng: &mut impl Rng) -> Result<Pos, GenerationError> {
    let height = grid.len();
    let width = grid[0].len();
    let max_attempts = width * height * SAMPLE_ATTEMPT_FACTOR;

    for _ in 0..max_attempts {
        let row = rng.gen_range(0..height);
        let col = rng.gen_range(0..width);
        if grid[row][col] == Cell::Path {
            return Ok(Pos { row, col });
        }
    }
    Err(GenerationError::PlacementExhausted {
        wanted,
        attempts: max_attempts,
    })
}
