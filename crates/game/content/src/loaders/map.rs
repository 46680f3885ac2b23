//! Map definitions: terrain generators plus spawn lists.
//!
//! A definition is a recipe, not a grid. Building it with a seed runs the
//! generators in order and spawns the roster, drawing every random value
//! (noise seeds, height jitter, rule chances, stat rolls) from the match RNG,
//! so two peers holding the same files and seed build identical battles.

use std::path::Path;

use game_core::{
    BattleState, ContentRegistry, Controller, GameConfig, Grid, MapDimensions, PcgRng, PlayerId,
    Position, RandomSource,
};
use serde::{Deserialize, Serialize};

use crate::loaders::noise::{FractalNoise, Octaves};
use crate::loaders::{LoadResult, read_file};

/// One terrain pass, applied in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MapGenerator {
    /// Every tile becomes `tile` at `height`.
    Fill { tile: String, height: f32 },
    /// Tiles of the rectangle become `tile`; `height` is optional.
    Rect {
        tile: String,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        #[serde(default)]
        elevation: Option<f32>,
    },
    /// Absolute heights, `rows[y][x]` starting at the origin.
    Heightmap { rows: Vec<Vec<f32>> },
    /// Adds an independent uniform offset in `[-amplitude, amplitude]` to
    /// every tile.
    Noise { amplitude: f32 },
    /// Octave value noise sampled per tile, in `[0, 1]`. Heights move by
    /// `(noise * 2 - 1) * amplitude`, then every rule runs in order against
    /// the tile's current type.
    Fractal {
        /// Tiles per noise cell of the first octave.
        #[serde(default = "default_scale")]
        scale: f32,
        #[serde(default = "default_octaves")]
        octaves: u32,
        #[serde(default = "default_persistence")]
        persistence: f32,
        #[serde(default = "default_lacunarity")]
        lacunarity: f32,
        #[serde(default)]
        amplitude: f32,
        #[serde(default)]
        rules: Vec<NoiseRule>,
    },
}

fn default_scale() -> f32 {
    30.0
}

fn default_octaves() -> u32 {
    3
}

fn default_persistence() -> f32 {
    0.5
}

fn default_lacunarity() -> f32 {
    2.0
}

fn always() -> f32 {
    1.0
}

/// Repaints `if_tile` tiles whose noise falls in `[above, below]`, each with
/// probability `chance`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseRule {
    pub if_tile: String,
    pub change_to: String,
    #[serde(default)]
    pub above: f32,
    #[serde(default = "always")]
    pub below: f32,
    #[serde(default = "always")]
    pub chance: f32,
}

/// A character placed when the map is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    /// Character template name.
    pub character: String,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub owner: u8,
    /// Overrides the template's controller.
    #[serde(default)]
    pub controller: Option<Controller>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDefinition {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Tile type of every tile before the generators run.
    pub fill: String,
    #[serde(default)]
    pub generators: Vec<MapGenerator>,
    #[serde(default)]
    pub spawns: Vec<SpawnPoint>,
}

impl MapDefinition {
    /// Checks every name against `registry` and every coordinate against the
    /// map bounds.
    pub fn validate(&self, registry: &ContentRegistry) -> LoadResult<()> {
        if self.width == 0 || self.height == 0 {
            anyhow::bail!("map '{}' has an empty grid", self.name);
        }
        registry.tile_by_name(&self.fill)?;
        for generator in &self.generators {
            match generator {
                MapGenerator::Fill { tile, .. } | MapGenerator::Rect { tile, .. } => {
                    registry.tile_by_name(tile)?;
                }
                MapGenerator::Heightmap { rows } => {
                    let too_wide = rows.iter().any(|row| row.len() > self.width as usize);
                    if rows.len() > self.height as usize || too_wide {
                        anyhow::bail!("map '{}' heightmap exceeds the grid", self.name);
                    }
                }
                MapGenerator::Noise { amplitude } => {
                    if *amplitude < 0.0 {
                        anyhow::bail!("map '{}' noise amplitude is negative", self.name);
                    }
                }
                MapGenerator::Fractal {
                    scale,
                    octaves,
                    amplitude,
                    rules,
                    ..
                } => {
                    if *scale <= 0.0 || *octaves == 0 || *amplitude < 0.0 {
                        anyhow::bail!(
                            "map '{}' fractal noise needs a positive scale, at least one octave \
                             and a non-negative amplitude",
                            self.name
                        );
                    }
                    for rule in rules {
                        registry.tile_by_name(&rule.if_tile)?;
                        registry.tile_by_name(&rule.change_to)?;
                        if rule.above > rule.below || !(0.0..=1.0).contains(&rule.chance) {
                            anyhow::bail!(
                                "map '{}' rule {} -> {} has an empty range or a bad chance",
                                self.name,
                                rule.if_tile,
                                rule.change_to
                            );
                        }
                    }
                }
            }
        }
        for spawn in &self.spawns {
            registry.character(&spawn.character)?;
            if !self.contains(Position::new(spawn.x, spawn.y)) {
                anyhow::bail!(
                    "map '{}' spawns '{}' outside the grid at ({}, {})",
                    self.name,
                    spawn.character,
                    spawn.x,
                    spawn.y
                );
            }
        }
        Ok(())
    }

    fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && (position.x as u32) < self.width
            && (position.y as u32) < self.height
    }

    /// Builds the battle for `seed`.
    pub fn build(&self, registry: &ContentRegistry, seed: u32) -> LoadResult<BattleState> {
        self.validate(registry)?;
        let (fill, fill_def) = registry.tile_by_name(&self.fill)?;
        let grid = Grid::new(
            MapDimensions::new(self.width, self.height),
            fill,
            fill_def.flags(),
            GameConfig::DEFAULT_TILE_HEIGHT,
        );
        let mut state = BattleState::new(seed, grid);
        let mut rng = state.rng;
        let (xs, ys) = (0..self.width as i32, 0..self.height as i32);
        self.paint(&self.fill, xs, ys, None, &mut state.grid, registry)?;

        for generator in &self.generators {
            self.generate(generator, &mut state.grid, registry, &mut rng)?;
        }

        for spawn in &self.spawns {
            let template = registry.character(&spawn.character)?;
            let mut character = template.spawn(registry, &mut rng)?.with_owner(PlayerId(spawn.owner));
            if let Some(controller) = spawn.controller {
                character = character.with_controller(controller);
            }
            let position = Position::new(spawn.x, spawn.y);
            let id = state.place_character(character, position).map_err(|e| {
                anyhow::anyhow!("map '{}' cannot place '{}': {}", self.name, spawn.character, e)
            })?;
            tracing::debug!(map = %self.name, character = %id, %position, "spawned");
        }

        state.rng = rng;
        Ok(state)
    }

    fn generate(
        &self,
        generator: &MapGenerator,
        grid: &mut Grid,
        registry: &ContentRegistry,
        rng: &mut PcgRng,
    ) -> LoadResult<()> {
        match generator {
            MapGenerator::Fill { tile, height } => {
                let (xs, ys) = (0..self.width as i32, 0..self.height as i32);
                self.paint(tile, xs, ys, Some(*height), grid, registry)
            }
            MapGenerator::Rect {
                tile,
                x,
                y,
                width,
                height,
                elevation,
            } => self.paint(
                tile,
                *x..x + *width as i32,
                *y..y + *height as i32,
                *elevation,
                grid,
                registry,
            ),
            MapGenerator::Heightmap { rows } => {
                for (y, row) in rows.iter().enumerate() {
                    for (x, &height) in row.iter().enumerate() {
                        grid.set_height(Position::new(x as i32, y as i32), height);
                    }
                }
                Ok(())
            }
            MapGenerator::Noise { amplitude } => {
                for index in 0..grid.len() {
                    let position = grid.position_of(index);
                    let offset = rng.range_f32(-amplitude, *amplitude);
                    if let Some(tile) = grid.tile_mut(position) {
                        tile.height += offset;
                    }
                }
                Ok(())
            }
            MapGenerator::Fractal {
                scale,
                octaves,
                persistence,
                lacunarity,
                amplitude,
                rules,
            } => {
                let noise = FractalNoise::new(rng.next_u32(), Octaves {
                    scale: *scale,
                    count: *octaves,
                    persistence: *persistence,
                    lacunarity: *lacunarity,
                });
                let rules = rules
                    .iter()
                    .map(|rule| -> LoadResult<_> {
                        let (from, _) = registry.tile_by_name(&rule.if_tile)?;
                        let (to, definition) = registry.tile_by_name(&rule.change_to)?;
                        Ok((rule, from, to, definition))
                    })
                    .collect::<LoadResult<Vec<_>>>()?;
                let mut repainted = 0usize;
                for index in 0..grid.len() {
                    let position = grid.position_of(index);
                    let value = noise.sample(position.x as f32, position.y as f32);
                    if let Some(tile) = grid.tile_mut(position) {
                        tile.height += (value * 2.0 - 1.0) * amplitude;
                    }
                    for (rule, from, to, definition) in &rules {
                        let matches = grid.tile(position).is_some_and(|tile| tile.kind == *from);
                        if !matches || value < rule.above || value > rule.below {
                            continue;
                        }
                        if rng.chance(rule.chance)
                            && grid.set_tile_type(
                                position,
                                *to,
                                definition.flags(),
                                &definition.solid_exceptions,
                            )
                        {
                            repainted += 1;
                        }
                    }
                }
                tracing::debug!(map = %self.name, repainted, "fractal noise applied");
                Ok(())
            }
        }
    }

    /// Assigns a tile type (and optionally a height) to every in-bounds tile
    /// of the given ranges.
    fn paint(
        &self,
        tile: &str,
        xs: std::ops::Range<i32>,
        ys: std::ops::Range<i32>,
        height: Option<f32>,
        grid: &mut Grid,
        registry: &ContentRegistry,
    ) -> LoadResult<()> {
        let (kind, definition) = registry.tile_by_name(tile)?;
        let flags = definition.flags();
        for y in ys {
            for x in xs.clone() {
                let position = Position::new(x, y);
                if !grid.set_tile_type(position, kind, flags, &definition.solid_exceptions) {
                    continue;
                }
                if let Some(height) = height {
                    grid.set_height(position, height);
                }
            }
        }
        Ok(())
    }
}

/// Map catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapCatalog {
    pub maps: Vec<MapDefinition>,
}

/// Loader for map definitions from RON files.
pub struct MapLoader;

impl MapLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<MapDefinition>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Vec<MapDefinition>> {
        let catalog: MapCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse map RON: {}", e))?;
        Ok(catalog.maps)
    }
}

#[cfg(test)]
mod tests {
    use game_core::{CharacterTemplate, Stats, TileDefinition, TileFlags, TileTypeId};

    use super::*;

    fn registry() -> ContentRegistry {
        let mut registry = ContentRegistry::new();
        registry.register_tile(TileDefinition::new("grass")).unwrap();
        registry
            .register_tile(TileDefinition::new("rock").solid())
            .unwrap();
        let mut soldier = CharacterTemplate::fixed("soldier", "red", Stats {
            max_hp: 10,
            speed: 5,
            ..Stats::default()
        });
        soldier.max_stats.speed = 9;
        registry.register_character(soldier).unwrap();
        registry
    }

    fn definition() -> MapDefinition {
        MapLoader::parse(
            r#"(maps: [(
                name: "pass",
                width: 4,
                height: 3,
                fill: "grass",
                generators: [
                    Rect(tile: "rock", x: 2, y: 0, width: 1, height: 2, elevation: Some(8.0)),
                    Heightmap(rows: [[1.0, 2.0]]),
                ],
                spawns: [
                    (character: "soldier", x: 0, y: 2, owner: 0),
                    (character: "soldier", x: 3, y: 2, owner: 1, controller: Some(Player)),
                ],
            )])"#,
        )
        .unwrap()
        .remove(0)
    }

    #[test]
    fn generators_run_in_order() {
        let state = definition().build(&registry(), 5).unwrap();
        let rock = state.grid.tile(Position::new(2, 1)).unwrap();
        assert!(rock.flags.contains(TileFlags::SOLID));
        assert_eq!(rock.height, 8.0);
        assert_eq!(state.grid.tile(Position::new(1, 0)).unwrap().height, 2.0);
        assert_eq!(
            state.grid.tile(Position::new(3, 0)).unwrap().height,
            GameConfig::DEFAULT_TILE_HEIGHT
        );
    }

    #[test]
    fn spawns_take_owner_and_controller() {
        let state = definition().build(&registry(), 5).unwrap();
        let characters = state.characters();
        assert_eq!(characters.len(), 2);
        assert_eq!(characters[0].owner, PlayerId(0));
        assert_eq!(characters[0].controller, Controller::Ai);
        assert_eq!(characters[1].owner, PlayerId(1));
        assert_eq!(characters[1].controller, Controller::Player);
    }

    #[test]
    fn same_seed_builds_the_same_battle() {
        let mut map = definition();
        map.generators.push(MapGenerator::Noise { amplitude: 0.5 });
        let a = map.build(&registry(), 9).unwrap();
        let b = map.build(&registry(), 9).unwrap();
        assert_eq!(a.digest(), b.digest());
        assert_eq!(a.grid, b.grid);
    }

    fn fractal(rules: Vec<NoiseRule>) -> MapGenerator {
        MapGenerator::Fractal {
            scale: 3.0,
            octaves: 2,
            persistence: 0.5,
            lacunarity: 2.0,
            amplitude: 1.0,
            rules,
        }
    }

    fn rule(above: f32, below: f32, chance: f32) -> NoiseRule {
        NoiseRule {
            if_tile: "grass".into(),
            change_to: "rock".into(),
            above,
            below,
            chance,
        }
    }

    fn kinds(state: &BattleState) -> Vec<TileTypeId> {
        state.grid.tiles().iter().map(|tile| tile.kind).collect()
    }

    #[test]
    fn fractal_defaults_parse_from_ron() {
        let maps = MapLoader::parse(
            r#"(maps: [(
                name: "moor",
                width: 2,
                height: 2,
                fill: "grass",
                generators: [Fractal(rules: [(if_tile: "grass", change_to: "rock", above: 0.6)])],
            )])"#,
        )
        .unwrap();
        let MapGenerator::Fractal {
            scale,
            octaves,
            amplitude,
            rules,
            ..
        } = &maps[0].generators[0]
        else {
            panic!("expected a fractal generator");
        };
        assert_eq!((*scale, *octaves, *amplitude), (30.0, 3, 0.0));
        assert_eq!(rules[0], rule(0.6, 1.0, 1.0));
    }

    #[test]
    fn fractal_rule_over_the_full_range_repaints_every_match() {
        let registry = registry();
        let mut map = definition();
        map.spawns.clear();
        map.generators = vec![fractal(vec![rule(0.0, 1.0, 1.0)])];
        let state = map.build(&registry, 3).unwrap();
        let (rock, _) = registry.tile_by_name("rock").unwrap();
        assert!(kinds(&state).iter().all(|kind| *kind == rock));
        assert!(state.grid.tiles().iter().all(|tile| tile.flags.contains(TileFlags::SOLID)));
    }

    #[test]
    fn fractal_rule_with_zero_chance_keeps_tiles() {
        let registry = registry();
        let mut map = definition();
        map.spawns.clear();
        map.generators = vec![fractal(vec![rule(0.0, 1.0, 0.0)])];
        let state = map.build(&registry, 3).unwrap();
        let (grass, _) = registry.tile_by_name("grass").unwrap();
        assert!(kinds(&state).iter().all(|kind| *kind == grass));
    }

    #[test]
    fn fractal_terrain_is_seeded() {
        let registry = registry();
        let mut map = definition();
        map.spawns.clear();
        map.width = 12;
        map.height = 12;
        map.generators = vec![fractal(vec![rule(0.5, 1.0, 1.0)])];
        let a = map.build(&registry, 21).unwrap();
        let b = map.build(&registry, 21).unwrap();
        assert_eq!(a.grid, b.grid);
        let heights: Vec<f32> = a.grid.tiles().iter().map(|tile| tile.height).collect();
        assert!(heights.iter().any(|h| *h != heights[0]));
    }

    #[test]
    fn bad_fractal_rules_are_fatal() {
        let registry = registry();
        let mut unknown = rule(0.0, 1.0, 1.0);
        unknown.change_to = "lava".into();
        for rules in [vec![unknown], vec![rule(0.8, 0.2, 1.0)], vec![rule(0.0, 1.0, 1.5)]] {
            let mut map = definition();
            map.generators.push(fractal(rules));
            assert!(map.validate(&registry).is_err());
        }
    }

    #[test]
    fn unknown_tile_names_are_fatal() {
        let mut map = definition();
        map.generators.push(MapGenerator::Fill {
            tile: "lava".into(),
            height: 1.0,
        });
        assert!(map.build(&registry(), 1).is_err());
    }

    #[test]
    fn spawns_outside_the_grid_are_fatal() {
        let mut map = definition();
        map.spawns[0].x = 10;
        assert!(map.validate(&registry()).is_err());
    }
}
