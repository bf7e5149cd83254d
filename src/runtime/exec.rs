//! Statement execution.

use std::sync::atomic::Ordering;
use std::time::Duration;

use tracing::{debug, trace};

use crate::audio::Waveform;
use crate::lang::{Error, Expr, FillArea, Stmt, StmtKind, Value};
use crate::sequencer::{Sheet, Song};

use super::environment::ScopeId;
use super::sprite::{Sprite, SpriteId};
use super::{Flow, Interpreter};

impl Interpreter {
    /// Execute statements in order in `scope`, stopping at the first halt.
    pub(crate) fn execute_all(&mut self, statements: &[Stmt], scope: ScopeId) -> Result<Flow, Error> {
        for stmt in statements {
            if self.execute(stmt, scope)? == Flow::Halt {
                return Ok(Flow::Halt);
            }
        }
        Ok(Flow::Next)
    }

    /// Execute statements in a fresh child of `parent`.
    fn execute_block(&mut self, statements: &[Stmt], parent: ScopeId) -> Result<Flow, Error> {
        let scope = self.env.push(parent);
        let result = self.execute_all(statements, scope);
        self.env.pop(scope);
        result
    }

    fn execute(&mut self, stmt: &Stmt, scope: ScopeId) -> Result<Flow, Error> {
        self.execute_kind(&stmt.kind, scope, stmt.line)
            .map_err(|e| e.at_line(stmt.line))
    }

    fn execute_kind(&mut self, kind: &StmtKind, scope: ScopeId, line: usize) -> Result<Flow, Error> {
        match kind {
            StmtKind::Let { name, init } => {
                let value = match init {
                    Some(expr) => self.evaluate(expr, scope)?,
                    None => Value::Null,
                };
                self.env.define(scope, name, value);
            }
            StmtKind::Expression(expr) => {
                self.evaluate(expr, scope)?;
            }
            StmtKind::Debug(expr) => {
                let message = self.evaluate(expr, scope)?.to_string();
                debug!(target: "oneshot::debug", line, "{message}");
                self.console.debug(&message);
            }
            StmtKind::Print(expr) => {
                let message = self.evaluate(expr, scope)?.to_string();
                self.console.print(&message);
            }

            StmtKind::Window { width, height } => {
                let width = self.number(width, scope, "WINDOW width")?;
                let height = self.number(height, scope, "WINDOW height")?;
                self.window = (width, height);
                self.surface.resize(width * self.scale, height * self.scale);
            }
            StmtKind::Color(expr) => {
                self.color = self.evaluate(expr, scope)?.to_string();
                self.surface.set_fill_color(&self.color);
            }
            StmtKind::Fill(area) => self.fill(area, scope)?,
            StmtKind::Text { x, y, text } => {
                let x = self.number(x, scope, "TEXT x")?;
                let y = self.number(y, scope, "TEXT y")?;
                let text = self.evaluate(text, scope)?.to_string();
                self.surface
                    .fill_text(&text, x * self.scale, y * self.scale, &self.font);
            }
            StmtKind::Sleep(ms) => {
                let ms = self.number(ms, scope, "SLEEP duration")?;
                if Duration::try_from_secs_f64(ms.max(0.0) / 1000.0).is_err() {
                    return Err(Error::runtime(format!("SLEEP duration out of range: {ms}")));
                }
                trace!(ms, "sleep");
                self.sequencer
                    .advance(ms / 1000.0, self.audio.as_mut(), self.timer.as_mut());
            }
            StmtKind::Draw {
                x,
                y,
                sprite,
                frame,
            } => {
                let x = self.number(x, scope, "DRAW x")?;
                let y = self.number(y, scope, "DRAW y")?;
                let id = self.env.lookup_sprite(scope, sprite)?;
                let frame = self.evaluate(frame, scope)?;
                self.draw(id, x, y, &frame)?;
            }

            StmtKind::Size { width, height } => {
                let width = self.extent(width, scope, "SIZE width")?;
                let height = self.extent(height, scope, "SIZE height")?;
                let sprite = self.active_sprite_mut(scope, "SIZE")?;
                sprite.width = width;
                sprite.height = height;
            }
            StmtKind::ColorData { key, color } => {
                let key = self.evaluate(key, scope)?;
                let key = palette_key(key.expect_str("COLORDATA key")?)?;
                let color = self.evaluate(color, scope)?.to_string();
                let (sprite, frame) = self.active_frame_mut(scope, "COLORDATA")?;
                sprite.set_color(frame, key, &color)?;
            }
            StmtKind::PixelData(rows) => {
                let rows = rows
                    .iter()
                    .map(|row| self.evaluate(row, scope))
                    .collect::<Result<Vec<_>, _>>()?;
                let (sprite, frame) = self.active_frame_mut(scope, "PIXELDATA")?;
                for row in &rows {
                    sprite.push_row(frame, row.expect_str("PIXELDATA row")?)?;
                }
            }

            StmtKind::Bar(expr) => {
                let text = self.evaluate(expr, scope)?.to_string();
                self.current_sheet_mut(scope, "BAR")?.append_bar(&text);
            }
            StmtKind::Gain(expr) => {
                let gain = self.number(expr, scope, "GAIN")?;
                self.current_sheet_mut(scope, "GAIN")?.gain = gain;
            }
            StmtKind::Type(expr) => {
                let value = self.evaluate(expr, scope)?;
                let waveform: Waveform = value.expect_str("TYPE")?.parse().map_err(Error::runtime)?;
                self.current_sheet_mut(scope, "TYPE")?.waveform = waveform;
            }
            StmtKind::Bpm(expr) => {
                let bpm = self.number(expr, scope, "BPM")?;
                if bpm <= 0.0 {
                    return Err(Error::runtime(format!("BPM must be positive, got {bpm}")));
                }
                self.active_song_mut(scope, "BPM")?.bpm = bpm;
            }
            StmtKind::Loop(expr) => {
                let looping = self.evaluate(expr, scope)?.is_truthy();
                self.active_song_mut(scope, "LOOP")?.looping = looping;
            }
            StmtKind::Play(name) => {
                let id = self.env.lookup_song(scope, name)?;
                if !self.sequencer.play(id, self.audio.as_mut()) {
                    debug!(song = %name, "PLAY ignored");
                }
            }
            StmtKind::Stop(name) => {
                let id = self.env.lookup_song(scope, name)?;
                self.sequencer.stop(id);
            }

            StmtKind::Block(body) => return self.execute_block(body, scope),
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let branch = if self.evaluate(condition, scope)?.is_truthy() {
                    then_branch
                } else {
                    else_branch
                };
                return self.execute_block(branch, scope);
            }
            StmtKind::While { condition, body } => return self.execute_loop(None, condition, body, scope),
            StmtKind::For {
                init,
                condition,
                increment,
                body,
            } => {
                let loop_scope = self.env.push(scope);
                let result = self
                    .execute(init, loop_scope)
                    .and_then(|_| self.execute_loop(Some(increment), condition, body, loop_scope));
                self.env.pop(loop_scope);
                return result;
            }

            StmtKind::Sprite { name, body } => {
                self.sprites.push(Sprite::new(name.as_str()));
                let id = SpriteId(self.sprites.len() - 1);
                debug!(sprite = %name, "sprite registered");
                self.env.define_sprite(scope, name, id);
                self.env.set_active_sprite(scope, Some(id));
                let result = self.execute_block(body, scope);
                self.env.set_active_sprite(scope, None);
                return result;
            }
            StmtKind::Frame { name, body } => {
                let sprite = self
                    .env
                    .active_sprite(scope)
                    .ok_or_else(|| Error::runtime("FRAME used outside of a SPRITE block"))?;
                let index = self.sprites[sprite.0].add_frame(name.as_deref());
                let frame_scope = self.env.push(scope);
                self.env.set_active_frame(frame_scope, Some((sprite, index)));
                let result = self.execute_all(body, frame_scope);
                self.env.pop(frame_scope);
                return result;
            }
            StmtKind::Song { name, body } => {
                let id = self.sequencer.create_song(name, self.audio.as_mut());
                self.env.define_song(scope, name, id);
                self.env.set_active_song(scope, Some(id));
                let result = self.execute_block(body, scope);
                self.env.set_active_song(scope, None);
                return result;
            }
            StmtKind::Sheet { body } => {
                let song = self
                    .env
                    .active_song(scope)
                    .ok_or_else(|| Error::runtime("SHEET used outside of a SONG block"))?;
                let index = self.active_song_mut(scope, "SHEET")?.add_sheet();
                let sheet_scope = self.env.push(scope);
                self.env.set_active_sheet(sheet_scope, Some((song, index)));
                let result = self.execute_all(body, sheet_scope);
                self.env.pop(sheet_scope);
                return result;
            }
        }
        Ok(Flow::Next)
    }

    /// Shared WHILE/FOR driver. The condition and increment run in `scope`;
    /// each pass of the body gets its own child scope.
    fn execute_loop(
        &mut self,
        increment: Option<&Expr>,
        condition: &Expr,
        body: &[Stmt],
        scope: ScopeId,
    ) -> Result<Flow, Error> {
        loop {
            if !self.running.load(Ordering::SeqCst) {
                debug!("loop cancelled");
                return Ok(Flow::Halt);
            }
            if !self.evaluate(condition, scope)?.is_truthy() {
                return Ok(Flow::Next);
            }
            if self.execute_block(body, scope)? == Flow::Halt {
                return Ok(Flow::Halt);
            }
            if let Some(increment) = increment {
                self.evaluate(increment, scope)?;
            }
        }
    }

    fn fill(&mut self, area: &FillArea, scope: ScopeId) -> Result<(), Error> {
        let (x, y, width, height) = match area {
            FillArea::All => (0.0, 0.0, self.window.0, self.window.1),
            FillArea::Rect {
                x,
                y,
                width,
                height,
            } => (
                self.number(x, scope, "FILL x")?,
                self.number(y, scope, "FILL y")?,
                self.number(width, scope, "FILL width")?,
                self.number(height, scope, "FILL height")?,
            ),
        };
        let s = self.scale;
        self.surface.fill_rect(x * s, y * s, width * s, height * s);
        Ok(())
    }

    /// Paint one cell per palette-mapped pixel, then restore the script's
    /// fill colour.
    fn draw(&mut self, id: SpriteId, x: f64, y: f64, selector: &Value) -> Result<(), Error> {
        let sprite = &self.sprites[id.0];
        let index = frame_index(sprite, selector)?;
        let s = self.scale;

        let mut painted = false;
        for (col, row, color) in sprite.frames[index].cells() {
            self.surface.set_fill_color(color);
            self.surface
                .fill_rect((x + col as f64) * s, (y + row as f64) * s, s, s);
            painted = true;
        }
        if painted {
            self.surface.set_fill_color(&self.color);
        }
        Ok(())
    }

    fn number(&mut self, expr: &Expr, scope: ScopeId, what: &str) -> Result<f64, Error> {
        self.evaluate(expr, scope)?.expect_number(what)
    }

    /// A non-negative whole grid size.
    fn extent(&mut self, expr: &Expr, scope: ScopeId, what: &str) -> Result<usize, Error> {
        let n = self.number(expr, scope, what)?;
        if n < 0.0 || !n.is_finite() {
            return Err(Error::runtime(format!("{what} must be a non-negative size, got {n}")));
        }
        Ok(n as usize)
    }

    fn active_sprite_mut(&mut self, scope: ScopeId, statement: &str) -> Result<&mut Sprite, Error> {
        let id = self
            .env
            .active_sprite(scope)
            .ok_or_else(|| Error::runtime(format!("{statement} used outside of a SPRITE block")))?;
        Ok(&mut self.sprites[id.0])
    }

    fn active_song_mut(&mut self, scope: ScopeId, statement: &str) -> Result<&mut Song, Error> {
        let missing = || Error::runtime(format!("{statement} used outside of a SONG block"));
        let id = self.env.active_song(scope).ok_or_else(missing)?;
        self.sequencer.song_mut(id).ok_or_else(missing)
    }

    /// The sprite and frame index of the FRAME block enclosing `scope`.
    fn active_frame_mut(&mut self, scope: ScopeId, statement: &str) -> Result<(&mut Sprite, usize), Error> {
        let (id, frame) = self
            .env
            .active_frame(scope)
            .ok_or_else(|| Error::runtime(format!("{statement} used outside of a FRAME block")))?;
        Ok((&mut self.sprites[id.0], frame))
    }

    fn current_sheet_mut(&mut self, scope: ScopeId, statement: &str) -> Result<&mut Sheet, Error> {
        let missing = || Error::runtime(format!("{statement} used outside of a SHEET block"));
        let (song, index) = self.env.active_sheet(scope).ok_or_else(missing)?;
        self.sequencer
            .song_mut(song)
            .and_then(|song| song.sheet_mut(index))
            .ok_or_else(missing)
    }
}

/// Resolve a DRAW frame selector: a number indexes modulo the frame count, a
/// string names a frame, null means the current frame.
fn frame_index(sprite: &Sprite, selector: &Value) -> Result<usize, Error> {
    if sprite.frames.is_empty() {
        return Err(Error::runtime(format!("sprite '{}' has no frames", sprite.name)));
    }
    match selector {
        Value::Number(n) => Ok((*n as i64).rem_euclid(sprite.frames.len() as i64) as usize),
        Value::Str(name) => sprite
            .frame_index(name)
            .ok_or_else(|| Error::runtime(format!("sprite '{}' has no frame '{name}'", sprite.name))),
        Value::Null => Ok(sprite.current),
        Value::Bool(_) => Err(Error::runtime(format!(
            "frame selector must be a number, string or null, got {}",
            selector.type_name()
        ))),
    }
}

fn palette_key(key: &str) -> Result<char, Error> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(ch),
        _ => Err(Error::runtime(format!(
            "COLORDATA key must be a single character, got \"{key}\""
        ))),
    }
}
