use rand::seq::SliceRandom;
use rand::Rng;

use crate::levels::LevelConfig;
use crate::maze::{generate, random_path_position, Cell, GenerationError, Grid, Pos};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    /// (row, col) offset of one step.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Dir::Up => (-1, 0),
            Dir::Down => (1, 0),
            Dir::Left => (0, -1),
            Dir::Right => (0, 1),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Status {
    Playing,
    Won,
    Lost,
}

/// One live session. Created fresh on every level (re)selection and mutated
/// only through `apply_move` and `tick`; the renderer reads it as a snapshot.
#[derive(Clone, PartialEq, Debug)]
pub struct Game {
    pub config: LevelConfig,
    pub grid: Grid,
    pub player: Pos,
    pub time_left: u32,
    pub items: u32,
    /// Roaming monster positions, independent of statically Monster-tagged
    /// grid cells. Seeded at random; may coincide with the player's start.
    pub monsters: Vec<Pos>,
    pub portals: Vec<Pos>,
    pub status: Status,
}

pub fn new_game(config: &LevelConfig, rng: &mut impl Rng) -> Result<Game, GenerationError> {
    let grid = generate(config, rng)?;
    let player = random_path_position(&grid, rng)?;
    let monsters = (0..config.monsters)
        .map(|_| random_path_position(&grid, rng))
        .collect::<Result<Vec<_>, _>>()?;
    let portals = (0..config.portals)
        .map(|_| random_path_position(&grid, rng))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Game {
        config: *config,
        grid,
        player,
        time_left: config.time_limit,
        items: 0,
        monsters,
        portals,
        status: Status::Playing,
    })
}

impl Game {
    pub fn width(&self) -> usize {
        self.grid[0].len()
    }

    pub fn height(&self) -> usize {
        self.grid.len()
    }

    /// Apply one player move and everything it triggers: cell effects,
    /// monster movement, collision, win/loss. Atomic per call; rejected
    /// moves (bounds, walls, failed exit gate) leave the state untouched.
    pub fn apply_move(&mut self, dir: Dir, rng: &mut impl Rng) {
        if self.status != Status::Playing {
            return;
        }

        let (dr, dc) = dir.delta();
        let row = self.player.row as isize + dr;
        let col = self.player.col as isize + dc;
        if row < 0 || col < 0 || row >= self.height() as isize || col >= self.width() as isize {
            return;
        }
        let (row, col) = (row as usize, col as usize);
        let cell = self.grid[row][col];
        if cell == Cell::Wall {
            return;
        }

        let from = self.player;
        self.player = Pos { row, col };

        match cell {
            Cell::Exit => {
                if self.config.rules.item_gate && self.items < self.config.items_required {
                    // Gate failed: the tentative step is reverted wholesale,
                    // so not even the monsters take a turn.
                    self.player = from;
                    return;
                }
                self.status = Status::Won;
            }
            Cell::Item => {
                self.items += 1;
                // Consumed: revisiting this cell is a plain path step.
                self.grid[row][col] = Cell::Path;
            }
            Cell::Trap | Cell::Monster => self.status = Status::Lost,
            Cell::Portal => {
                if let Some(other) = self.portals.iter().copied().find(|p| *p != self.player) {
                    self.player = other;
                }
            }
            Cell::Wall | Cell::Path | Cell::Fog => {}
        }

        if self.config.rules.monsters_roam {
            self.move_monsters(rng);
            if self.monsters.iter().any(|m| *m == self.player) {
                self.status = Status::Lost;
            }
        }
    }

    /// Every monster steps to a uniformly random non-Wall neighbor. A monster
    /// with no open neighbor stays put that turn.
    fn move_monsters(&mut self, rng: &mut impl Rng) {
        let grid = &self.grid;
        let height = grid.len() as isize;
        let width = grid[0].len() as isize;
        for monster in self.monsters.iter_mut() {
            let mut options = Vec::new();
            for dir in [Dir::Up, Dir::Down, Dir::Left, Dir::Right] {
                let (dr, dc) = dir.delta();
                let nr = monster.row as isize + dr;
                let nc = monster.col as isize + dc;
                if nr < 0 || nc < 0 || nr >= height || nc >= width {
                    continue;
                }
                if grid[nr as usize][nc as usize] == Cell::Wall {
                    continue;
                }
                options.push(Pos {
                    row: nr as usize,
                    col: nc as usize,
                });
            }
            if let Some(&next) = options.choose(rng) {
                *monster = next;
            }
        }
    }

    /// One second off the clock. The driver fires this at 1 Hz while the
    /// game is in play; terminal states absorb any stray tick.
    pub fn tick(&mut self) {
        if self.status != Status::Playing {
            return;
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            self.status = Status::Lost;
        }
    }

    /// Fog-of-war visibility: everything within Chebyshev distance 2 of the
    /// player, or the whole grid on levels without fog-of-war.
    pub fn is_visible(&self, pos: Pos) -> bool {
        if !self.config.rules.fog_of_war {
            return true;
        }
        pos.row.abs_diff(self.player.row) <= 2 && pos.col.abs_diff(self.player.col) <= 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::{LevelConfig, LevelRules};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rules() -> LevelRules {
        LevelRules {
            item_gate: false,
            monsters_roam: false,
            fog_of_war: false,
        }
    }

    fn config_for(grid: &Grid) -> LevelConfig {
        LevelConfig {
            width: grid[0].len(),
            height: grid.len(),
            time_limit: 60,
            items_required: 0,
            monsters: 0,
            traps: 0,
            portals: 0,
            fog_percentage: 0,
            rules: rules(),
        }
    }

    /// Handcrafted session over a fixed grid, player at (1,1).
    fn game_on(grid: Grid) -> Game {
        let config = config_for(&grid);
        Game {
            config,
            grid,
            player: Pos { row: 1, col: 1 },
            time_left: config.time_limit,
            items: 0,
            monsters: Vec::new(),
            portals: Vec::new(),
            status: Status::Playing,
        }
    }

    /// 5x5 walled arena with an open 3x3 interior of `fill`.
    fn arena(fill: Cell) -> Grid {
        let mut grid = vec![vec![Cell::Wall; 5]; 5];
        for row in 1..4 {
            for col in 1..4 {
                grid[row][col] = fill;
            }
        }
        grid
    }

    #[test]
    fn wall_move_leaves_state_identical() {
        let game = game_on(arena(Cell::Path));
        let mut moved = game.clone();
        let mut rng = StdRng::seed_from_u64(0);
        moved.apply_move(Dir::Up, &mut rng);
        assert_eq!(moved, game);
    }

    #[test]
    fn out_of_bounds_move_is_rejected() {
        let mut grid = arena(Cell::Path);
        // Open the border so the bounds check is what rejects the move.
        grid[0][0] = Cell::Path;
        grid[0][1] = Cell::Path;
        let mut game = game_on(grid);
        game.player = Pos { row: 0, col: 1 };
        let before = game.clone();
        let mut rng = StdRng::seed_from_u64(0);
        game.apply_move(Dir::Up, &mut rng);
        assert_eq!(game, before);
    }

    #[test]
    fn item_pickup_is_consumed_and_not_recounted() {
        let mut grid = arena(Cell::Path);
        grid[1][2] = Cell::Item;
        let mut game = game_on(grid);
        let mut rng = StdRng::seed_from_u64(0);

        game.apply_move(Dir::Right, &mut rng);
        assert_eq!(game.items, 1);
        assert_eq!(game.grid[1][2], Cell::Path);

        // Step off and back on; the cell is plain path now.
        game.apply_move(Dir::Left, &mut rng);
        game.apply_move(Dir::Right, &mut rng);
        assert_eq!(game.items, 1);
    }

    #[test]
    fn trap_loses_and_terminal_state_absorbs_moves() {
        let mut grid = arena(Cell::Path);
        grid[1][2] = Cell::Trap;
        let mut game = game_on(grid);
        let mut rng = StdRng::seed_from_u64(0);

        game.apply_move(Dir::Right, &mut rng);
        assert_eq!(game.status, Status::Lost);

        let after = game.clone();
        game.apply_move(Dir::Down, &mut rng);
        game.apply_move(Dir::Left, &mut rng);
        assert_eq!(game, after);
    }

    #[test]
    fn monster_tagged_cell_loses() {
        let mut grid = arena(Cell::Path);
        grid[2][1] = Cell::Monster;
        let mut game = game_on(grid);
        let mut rng = StdRng::seed_from_u64(0);
        game.apply_move(Dir::Down, &mut rng);
        assert_eq!(game.status, Status::Lost);
    }

    #[test]
    fn portal_teleport_is_symmetric() {
        let mut grid = arena(Cell::Path);
        grid[1][2] = Cell::Portal;
        grid[3][2] = Cell::Portal;
        let mut game = game_on(grid);
        game.portals = vec![Pos { row: 1, col: 2 }, Pos { row: 3, col: 2 }];
        let mut rng = StdRng::seed_from_u64(0);

        // Entering the first portal lands on the second endpoint.
        game.apply_move(Dir::Right, &mut rng);
        assert_eq!(game.player, Pos { row: 3, col: 2 });
        assert_eq!(game.grid[1][2], Cell::Portal, "portals are reusable");

        // And entering from the far side comes back.
        game.player = Pos { row: 3, col: 1 };
        game.apply_move(Dir::Right, &mut rng);
        assert_eq!(game.player, Pos { row: 1, col: 2 });
    }

    #[test]
    fn gated_exit_reverts_the_move_without_items() {
        let mut grid = arena(Cell::Path);
        grid[1][2] = Cell::Exit;
        let mut game = game_on(grid);
        game.config.rules.item_gate = true;
        game.config.items_required = 2;
        let before = game.clone();
        let mut rng = StdRng::seed_from_u64(0);

        game.apply_move(Dir::Right, &mut rng);
        assert_eq!(game.status, Status::Playing);
        assert_eq!(game.player, Pos { row: 1, col: 1 }, "position reverted");
        assert_eq!(game, before);

        // With enough items the same step wins.
        game.items = 2;
        game.apply_move(Dir::Right, &mut rng);
        assert_eq!(game.status, Status::Won);
    }

    #[test]
    fn failed_gate_suppresses_monster_movement() {
        let mut grid = arena(Cell::Path);
        grid[1][2] = Cell::Exit;
        let mut game = game_on(grid);
        game.config.rules.item_gate = true;
        game.config.items_required = 1;
        game.config.rules.monsters_roam = true;
        game.monsters = vec![Pos { row: 3, col: 3 }];
        let mut rng = StdRng::seed_from_u64(0);

        game.apply_move(Dir::Right, &mut rng);
        assert_eq!(game.monsters, vec![Pos { row: 3, col: 3 }]);
    }

    #[test]
    fn ungated_exit_wins() {
        let mut grid = arena(Cell::Path);
        grid[2][1] = Cell::Exit;
        let mut game = game_on(grid);
        let mut rng = StdRng::seed_from_u64(0);
        game.apply_move(Dir::Down, &mut rng);
        assert_eq!(game.status, Status::Won);
    }

    #[test]
    fn roaming_monster_steps_to_an_open_neighbor() {
        let mut game = game_on(arena(Cell::Path));
        game.config.rules.monsters_roam = true;
        game.monsters = vec![Pos { row: 2, col: 2 }];
        let mut rng = StdRng::seed_from_u64(5);

        game.apply_move(Dir::Right, &mut rng);
        let monster = game.monsters[0];
        assert_ne!(monster, Pos { row: 2, col: 2 });
        assert_eq!(monster.row.abs_diff(2) + monster.col.abs_diff(2), 1);
        assert_ne!(game.grid[monster.row][monster.col], Cell::Wall);
    }

    #[test]
    fn boxed_in_monster_stays_put() {
        let mut grid = vec![vec![Cell::Wall; 7]; 7];
        grid[1][1] = Cell::Path;
        grid[1][2] = Cell::Path;
        // Monster cell walled in on all four sides.
        grid[3][3] = Cell::Path;
        let mut game = game_on(grid);
        game.config.rules.monsters_roam = true;
        game.monsters = vec![Pos { row: 3, col: 3 }];
        let mut rng = StdRng::seed_from_u64(0);

        game.apply_move(Dir::Right, &mut rng);
        assert_eq!(game.monsters, vec![Pos { row: 3, col: 3 }]);
    }

    #[test]
    fn monster_adjacent_to_the_border_never_leaves_the_grid() {
        // Open corner cell: two neighbors are out of bounds and must be
        // skipped before the tag is read.
        let mut grid = vec![vec![Cell::Wall; 5]; 5];
        for row in 0..5 {
            for col in 0..5 {
                grid[row][col] = Cell::Path;
            }
        }
        let mut game = game_on(grid);
        game.config.rules.monsters_roam = true;
        game.monsters = vec![Pos { row: 0, col: 0 }];
        for seed in 0..50 {
            game.monsters[0] = Pos { row: 0, col: 0 };
            game.player = Pos { row: 2, col: 2 };
            game.status = Status::Playing;
            let mut rng = StdRng::seed_from_u64(seed);
            game.apply_move(Dir::Right, &mut rng);
            let monster = game.monsters[0];
            assert!(monster.row < 5 && monster.col < 5);
        }
    }

    #[test]
    fn monster_landing_on_player_loses_after_all_moves() {
        // Corridor: the monster's only open step is onto the player.
        let mut grid = vec![vec![Cell::Wall; 5]; 5];
        grid[1][1] = Cell::Path;
        grid[1][2] = Cell::Path;
        grid[1][3] = Cell::Path;
        let mut game = game_on(grid);
        game.config.rules.monsters_roam = true;
        game.monsters = vec![Pos { row: 1, col: 3 }];
        let mut rng = StdRng::seed_from_u64(0);

        game.apply_move(Dir::Right, &mut rng);
        assert_eq!(game.player, Pos { row: 1, col: 2 });
        assert_eq!(game.status, Status::Lost);
    }

    #[test]
    fn tick_counts_down_to_a_loss_and_then_stops() {
        let mut game = game_on(arena(Cell::Path));
        game.time_left = 1;
        game.tick();
        assert_eq!(game.time_left, 0);
        assert_eq!(game.status, Status::Lost);

        let after = game.clone();
        game.tick();
        assert_eq!(game, after);
    }

    #[test]
    fn everything_is_visible_without_fog_of_war() {
        let mut game = game_on(arena(Cell::Path));
        game.player = Pos { row: 2, col: 2 };
        assert!(game.is_visible(Pos { row: 0, col: 0 }));
        assert!(game.is_visible(Pos { row: 4, col: 4 }));
    }

    #[test]
    fn visibility_cuts_off_past_radius_two() {
        let grid = vec![vec![Cell::Path; 9]; 9];
        let mut game = game_on(grid);
        game.config.rules.fog_of_war = true;
        game.player = Pos { row: 4, col: 4 };
        assert!(game.is_visible(Pos { row: 2, col: 6 }));
        assert!(!game.is_visible(Pos { row: 1, col: 4 }));
        assert!(!game.is_visible(Pos { row: 4, col: 7 }));
    }

    #[test]
    fn end_to_end_walk_to_the_exit_wins() {
        // Level-1 shape: traps only. Handcrafted corridor so the route is
        // deterministic; the forced exit corner seals the run.
        let mut grid = vec![vec![Cell::Wall; 15]; 15];
        for col in 1..14 {
            grid[1][col] = Cell::Path;
        }
        for row in 1..14 {
            grid[row][13] = Cell::Path;
        }
        grid[3][1] = Cell::Trap;
        grid[5][5] = Cell::Trap;
        grid[13][13] = Cell::Exit;
        let mut game = game_on(grid);
        let mut rng = StdRng::seed_from_u64(0);

        for _ in 0..12 {
            game.apply_move(Dir::Right, &mut rng);
        }
        for _ in 0..12 {
            game.apply_move(Dir::Down, &mut rng);
        }
        assert_eq!(game.player, Pos { row: 13, col: 13 });
        assert_eq!(game.status, Status::Won);
    }

    #[test]
    fn new_game_seeds_everything_from_the_rule_table() {
        let config = crate::levels::level_config(3).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let game = new_game(config, &mut rng).unwrap();
        assert_eq!(game.status, Status::Playing);
        assert_eq!(game.time_left, 180);
        assert_eq!(game.items, 0);
        assert_eq!(game.monsters.len(), 3);
        assert_eq!(game.portals.len(), 3);
        assert_eq!(game.grid[game.player.row][game.player.col], Cell::Path);
        for pos in game.monsters.iter().chain(game.portals.iter()) {
            assert_eq!(game.grid[pos.row][pos.col], Cell::Path);
        }
    }
}
