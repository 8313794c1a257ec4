/// Terminal rendering. All crossterm output goes through here.
///
/// Each function receives a mutable writer and an immutable view of the
/// game state. No game logic is performed; this module only translates
/// state into terminal commands.
///
/// World space maps onto the framed play field: world (x, y) lands at
/// column `x + 1`, row `y + 2` (row 0 is the HUD, row 1 the top border).
use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use glam::Vec2;
use reef_rush::entities::{
    BonusItem, BonusKind, CarryOver, Fish, GameStatus, GameWorld, Hazard, HazardKind, OysterPhase,
    PermanentOyster, PlayArea, PowerUpKind, SizeClass, Species, StageKind,
};
use reef_rush::frenzy::FrenzyLevel;
use reef_rush::highscore::HighScoreTable;
use reef_rush::special;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_LIVES: Color = Color::Red;
const C_HUD_GROWTH: Color = Color::Green;
const C_PLAYER: Color = Color::White;
const C_PLAYER_HURT: Color = Color::DarkGrey;
const C_PLAYER_STUNNED: Color = Color::Yellow;
const C_PLAYER_REVERSED: Color = Color::Magenta;
const C_SMALL_FISH: Color = Color::Green;
const C_MEDIUM_FISH: Color = Color::Yellow;
const C_LARGE_FISH: Color = Color::Red;
const C_POISON: Color = Color::Magenta;
const C_FROZEN: Color = Color::Cyan;
const C_HAZARD: Color = Color::DarkRed;
const C_JELLY: Color = Color::Magenta;
const C_BONUS: Color = Color::Yellow;
const C_POWERUP: Color = Color::Cyan;
const C_OYSTER: Color = Color::Grey;
const C_HINT: Color = Color::DarkGrey;
const C_FRENZY: Color = Color::Red;
const C_SUPER_FRENZY: Color = Color::Magenta;

/// Sprite used when an entity's real sprite would be clipped by the frame.
const FALLBACK_GLYPH: &str = "•";

// ── Coordinates ───────────────────────────────────────────────────────────────

/// Play area that fits a terminal of `width` × `height` cells.
pub fn play_area_for(width: u16, height: u16) -> PlayArea {
    PlayArea::new(width.saturating_sub(2) as f32, height.saturating_sub(4) as f32)
}

/// Terminal cell → world position (used for the mouse follow target).
pub fn cell_to_world(column: u16, row: u16) -> Vec2 {
    Vec2::new(column as f32 - 1.0 + 0.5, row as f32 - 2.0 + 0.5)
}

fn world_to_cell(pos: Vec2, area: &PlayArea) -> Option<(u16, u16)> {
    if pos.x < 0.0 || pos.y < 0.0 || pos.x >= area.width || pos.y >= area.height {
        return None;
    }
    Some((pos.x as u16 + 1, pos.y as u16 + 2))
}

/// Draws `glyph` centred on `pos`, degrading to a single dot at the edges.
fn draw_sprite<W: Write>(
    out: &mut W,
    pos: Vec2,
    glyph: &str,
    color: Color,
    area: &PlayArea,
) -> std::io::Result<()> {
    let Some((col, row)) = world_to_cell(pos, area) else {
        return Ok(());
    };
    let len = glyph.chars().count() as u16;
    let start = col.saturating_sub(len / 2);
    let fits = start >= 1 && (start + len) as f32 <= area.width + 1.0;
    out.queue(style::SetForegroundColor(color))?;
    if fits {
        out.queue(cursor::MoveTo(start, row))?;
        out.queue(Print(glyph))?;
    } else {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(Print(FALLBACK_GLYPH))?;
    }
    Ok(())
}

fn centered<W: Write>(out: &mut W, width: u16, row: u16, text: &str, color: Color) -> std::io::Result<()> {
    let col = (width / 2).saturating_sub(text.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(text))?;
    Ok(())
}

fn finish<W: Write>(out: &mut W, height: u16) -> std::io::Result<()> {
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, height.saturating_sub(1)))?;
    out.flush()
}

// ── Playing screen ────────────────────────────────────────────────────────────

/// Render one complete gameplay frame, plus the pause overlay if asked.
pub fn render_world<W: Write>(
    out: &mut W,
    world: &GameWorld,
    (width, height): (u16, u16),
    paused: bool,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, width, height)?;
    draw_hud(out, world, width)?;

    let area = &world.area;
    for oyster in &world.oysters {
        draw_oyster(out, oyster, area)?;
    }
    for item in &world.bonus_items {
        draw_bonus_item(out, item, area)?;
    }
    for hazard in &world.hazards {
        draw_hazard(out, hazard, area)?;
    }
    for fish in world.live_fish() {
        draw_fish(out, fish, area)?;
    }
    draw_player(out, world)?;
    draw_controls_hint(out, height)?;

    match world.status {
        GameStatus::StageClear => draw_stage_clear(out, world, width, height)?,
        GameStatus::GameOver => centered(out, width, height / 2, "GAME  OVER", Color::Red)?,
        GameStatus::Playing if paused => {
            centered(out, width, height / 2, "╔══════════╗", Color::White)?;
            centered(out, width, height / 2 + 1, "║  PAUSED  ║", Color::White)?;
            centered(out, width, height / 2 + 2, "╚══════════╝", Color::White)?;
            centered(out, width, height / 2 + 3, "P - Resume  Q - Menu", C_HINT)?;
        }
        GameStatus::Playing => {}
    }

    finish(out, height)
}

fn draw_border<W: Write>(out: &mut W, width: u16, height: u16) -> std::io::Result<()> {
    let w = width as usize;
    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, height.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..height.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(width.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }
    Ok(())
}

fn size_label(size: SizeClass) -> &'static str {
    match size {
        SizeClass::Small => "S",
        SizeClass::Medium => "M",
        SizeClass::Large => "L",
    }
}

fn growth_bar(world: &GameWorld) -> String {
    const SLOTS: u32 = 10;
    let goal = world.config.stage_goal.max(1);
    let filled = (world.player.growth.min(goal) * SLOTS / goal) as usize;
    format!("[{}{}]", "█".repeat(filled), "░".repeat(SLOTS as usize - filled))
}

fn draw_hud<W: Write>(out: &mut W, world: &GameWorld, width: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("Score:{:>7}  Hi:{:>7}", world.score, world.high_score)))?;

    out.queue(style::SetForegroundColor(C_HUD_GROWTH))?;
    let stage = match world.stage {
        StageKind::Normal => format!("  L{} {} {}", world.level, size_label(world.player.size), growth_bar(world)),
        StageKind::Bonus => format!("  BONUS {:>2}s", world.stage_time_left.ceil() as u32),
    };
    out.queue(Print(stage))?;

    let frenzy = world.frenzy.level();
    if frenzy != FrenzyLevel::None {
        let color = if frenzy == FrenzyLevel::SuperFrenzy { C_SUPER_FRENZY } else { C_FRENZY };
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(format!("  {}", frenzy.label())))?;
    }

    let power_tags: String = world
        .power_ups
        .iter()
        .map(|p| format!("[{} {:>2}s] ", p.kind.label(), p.remaining.ceil() as u32))
        .collect();
    let lives_str = format!("Lives:{}", "♥".repeat(world.player.lives as usize));
    let right_len = (power_tags.chars().count() + lives_str.chars().count()) as u16;
    out.queue(cursor::MoveTo(width.saturating_sub(right_len + 1), 0))?;
    if !power_tags.is_empty() {
        out.queue(style::SetForegroundColor(C_POWERUP))?;
        out.queue(Print(&power_tags))?;
    }
    out.queue(style::SetForegroundColor(C_HUD_LIVES))?;
    out.queue(Print(&lives_str))?;
    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn fish_glyph(fish: &Fish) -> &'static str {
    let right = fish.body.velocity.x >= 0.0;
    match (fish.species, right) {
        (Species::Minnow, true) => "><>",
        (Species::Minnow, false) => "<><",
        (Species::Angelfish, true) => "<}>",
        (Species::Angelfish, false) => "<{>",
        (Species::PoisonFish, true) => "%>",
        (Species::PoisonFish, false) => "<%",
        (Species::Snapper, true) => ">=<>",
        (Species::Snapper, false) => "<>=<",
        (Species::Pufferfish, _) if special::is_inflated(fish) => "(O)",
        (Species::Pufferfish, _) => "(o)",
        (Species::Shark, true) => "\\==<>",
        (Species::Shark, false) => "<>==/",
        (Species::Barracuda, true) => ">====>",
        (Species::Barracuda, false) => "<====<",
    }
}

fn draw_fish<W: Write>(out: &mut W, fish: &Fish, area: &PlayArea) -> std::io::Result<()> {
    let color = if fish.status.frozen.is_some() {
        C_FROZEN
    } else if fish.status.poisoned.is_some() || fish.species == Species::PoisonFish {
        C_POISON
    } else {
        match fish.size {
            SizeClass::Small => C_SMALL_FISH,
            SizeClass::Medium => C_MEDIUM_FISH,
            SizeClass::Large => C_LARGE_FISH,
        }
    };
    draw_sprite(out, fish.body.position, fish_glyph(fish), color, area)
}

fn draw_player<W: Write>(out: &mut W, world: &GameWorld) -> std::io::Result<()> {
    let p = &world.player;
    // Blink while the post-damage grace period runs.
    if p.is_recovering() && world.frame % 4 < 2 {
        return Ok(());
    }
    let right = p.body.velocity.x >= 0.0;
    let glyph = match (p.size, right) {
        (SizeClass::Small, true) => "@>",
        (SizeClass::Small, false) => "<@",
        (SizeClass::Medium, true) => "(@@>",
        (SizeClass::Medium, false) => "<@@)",
        (SizeClass::Large, true) => "((@@@>",
        (SizeClass::Large, false) => "<@@@))",
    };
    let color = if p.is_stunned() {
        C_PLAYER_STUNNED
    } else if p.controls_reversed() {
        C_PLAYER_REVERSED
    } else if p.is_recovering() {
        C_PLAYER_HURT
    } else if world.power_ups.is_active(PowerUpKind::Invincibility) {
        C_POWERUP
    } else {
        C_PLAYER
    };
    draw_sprite(out, p.body.position, glyph, color, &world.area)
}

fn draw_hazard<W: Write>(out: &mut W, hazard: &Hazard, area: &PlayArea) -> std::io::Result<()> {
    match hazard.kind {
        HazardKind::Bomb { fuse, .. } => {
            let glyph = if fuse < 1.5 { "(*)" } else { "(o)" };
            draw_sprite(out, hazard.body.position, glyph, C_HAZARD, area)
        }
        HazardKind::Jellyfish { .. } => draw_sprite(out, hazard.body.position, "{~}", C_JELLY, area),
    }
}

/// Symbols:
///   *   Starfish
///   o   loose pearl
///   P   power-up (letter per kind)
fn draw_bonus_item<W: Write>(out: &mut W, item: &BonusItem, area: &PlayArea) -> std::io::Result<()> {
    let (glyph, color) = match item.kind {
        BonusKind::Starfish => ("*", C_BONUS),
        BonusKind::PearlOyster => ("o", Color::White),
        BonusKind::PowerUp(kind) => {
            let letter = match kind {
                PowerUpKind::ScoreDoubler => "2",
                PowerUpKind::FrenzyStarter => "F",
                PowerUpKind::SpeedBoost => "S",
                PowerUpKind::Invincibility => "I",
                PowerUpKind::Freeze => "Z",
                PowerUpKind::ExtraLife => "♥",
                PowerUpKind::Shield => "O",
            };
            (letter, C_POWERUP)
        }
    };
    draw_sprite(out, item.body.position, glyph, color, area)
}

fn draw_oyster<W: Write>(out: &mut W, oyster: &PermanentOyster, area: &PlayArea) -> std::io::Result<()> {
    let glyph = match oyster.phase {
        OysterPhase::Closed => "<=>",
        OysterPhase::Opening | OysterPhase::Closing => "<->",
        OysterPhase::Open if oyster.collect_cooldown > 0.0 => "< >",
        OysterPhase::Open => "<o>",
    };
    let color = if oyster.phase == OysterPhase::Closing { C_HAZARD } else { C_OYSTER };
    draw_sprite(out, oyster.body.position, glyph, color, area)
}

fn draw_controls_hint<W: Write>(out: &mut W, height: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("WASD / arrows / mouse : Swim   P : Pause   Q : Menu"))?;
    Ok(())
}

fn draw_stage_clear<W: Write>(out: &mut W, world: &GameWorld, width: u16, height: u16) -> std::io::Result<()> {
    let title = match world.stage {
        StageKind::Normal => format!("STAGE {} CLEAR!", world.level),
        StageKind::Bonus => "BONUS STAGE OVER".to_string(),
    };
    centered(out, width, (height / 2).saturating_sub(1), &title, Color::Yellow)?;
    centered(out, width, height / 2, &format!("Score: {}", world.score), Color::White)?;
    Ok(())
}

// ── Other screens ─────────────────────────────────────────────────────────────

pub fn render_menu<W: Write>(out: &mut W, best: u64, (width, height): (u16, u16)) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let cy = height / 2;

    centered(out, width, cy.saturating_sub(6), "><>  REEF  RUSH  <><", Color::Cyan)?;
    if best > 0 {
        centered(out, width, cy.saturating_sub(5), &format!("Best Score: {}", best), Color::Yellow)?;
    }

    let lines: &[(&str, Color)] = &[
        ("Eat smaller fish, grow, avoid the big ones.", Color::White),
        ("Bite the tail of fish two sizes up for a bonus.", Color::DarkGrey),
        ("Eat 4 fish in 2 seconds for a FRENZY.", Color::DarkGrey),
        ("", Color::DarkGrey),
        ("[ENTER] Start   [H] High scores   [Q] Quit", Color::Green),
    ];
    for (i, (text, color)) in lines.iter().enumerate() {
        centered(out, width, cy.saturating_sub(3) + i as u16, text, *color)?;
    }

    let legend = "* starfish  o pearl  (o) bomb  {~} jellyfish  <o> oyster";
    centered(out, width, cy + 4, legend, C_HINT)?;
    finish(out, height)
}

pub fn render_stage_intro<W: Write>(out: &mut W, carry: &CarryOver, (width, height): (u16, u16)) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let cy = height / 2;
    let title = match carry.stage {
        StageKind::Normal => format!("LEVEL {}", carry.level),
        StageKind::Bonus => "BONUS STAGE".to_string(),
    };
    centered(out, width, cy.saturating_sub(2), &title, Color::Cyan)?;
    centered(out, width, cy, &format!("Score {}   Lives {}", carry.score, carry.lives), Color::White)?;
    let hint = match carry.stage {
        StageKind::Normal => "Grow big enough to clear the reef",
        StageKind::Bonus => "Grab every pearl before time runs out",
    };
    centered(out, width, cy + 2, hint, C_HINT)?;
    finish(out, height)
}

pub fn render_game_over<W: Write>(
    out: &mut W,
    carry: &CarryOver,
    rank: Option<usize>,
    (width, height): (u16, u16),
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let cy = height / 2;

    centered(out, width, cy.saturating_sub(6), "╔════════════════════╗", Color::Red)?;
    centered(out, width, cy.saturating_sub(5), "║    GAME  OVER      ║", Color::Red)?;
    centered(out, width, cy.saturating_sub(4), "╚════════════════════╝", Color::Red)?;
    centered(out, width, cy.saturating_sub(2), &format!("Final Score: {:>7}", carry.score), Color::Yellow)?;

    let best_line = match rank {
        Some(0) => format!("★ NEW BEST: {:>7} ★", carry.score),
        Some(r) => format!("High score #{}", r + 1),
        None => format!("Best Score:  {:>7}", carry.high_score),
    };
    centered(out, width, cy.saturating_sub(1), &best_line, Color::Yellow)?;

    let stats = &carry.stats;
    let summary = format!(
        "Fish {}  Tail-bites {}  Frenzies {}/{}  Pearls {}  Stages {}",
        stats.total_eaten(),
        stats.tail_bites,
        stats.frenzies,
        stats.super_frenzies,
        stats.pearls,
        stats.stages_cleared
    );
    centered(out, width, cy + 1, &summary, Color::White)?;
    centered(out, width, cy + 3, "ENTER - Menu   H - High scores   Q - Quit", C_HINT)?;
    finish(out, height)
}

pub fn render_high_scores<W: Write>(
    out: &mut W,
    table: &HighScoreTable,
    (width, height): (u16, u16),
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let top = (height / 2).saturating_sub(table.capacity() as u16 / 2 + 2);
    centered(out, width, top, "HIGH SCORES", Color::Cyan)?;
    if table.entries().is_empty() {
        centered(out, width, top + 2, "No scores yet", C_HINT)?;
    }
    for (i, entry) in table.entries().iter().enumerate() {
        let line = format!("{:>2}. {:<12} {:>8}", i + 1, entry.name, entry.score);
        let color = if i == 0 { Color::Yellow } else { Color::White };
        centered(out, width, top + 2 + i as u16, &line, color)?;
    }
    centered(out, width, top + 3 + table.entries().len() as u16, "ENTER - Back", C_HINT)?;
    finish(out, height)
}
