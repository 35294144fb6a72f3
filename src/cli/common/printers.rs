// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Pretty printers for reporting information on a simulation.

use std::{borrow::Cow, sync::Mutex};

use log::Level;

const VERTICAL: char = '│';
const UP_AND_RIGHT: char = '└';
const VERTICAL_AND_RIGHT: char = '├';

type Block = Vec<Cow<'static, str>>;

lazy_static::lazy_static! {
    static ref DEFERRED_WARNINGS: Mutex<Vec<Block>> = Mutex::new(vec![]);
}

/// Log `blocks` as a tree under `title`. The first line of each block gets a
/// branch; continuation lines get a vertical bar.
fn log_tree(level: Level, title: &str, blocks: &[Block]) {
    log::log!(level, "{}", console::style(title).bold());
    let num_blocks = blocks.len();
    for (i_block, block) in blocks.iter().enumerate() {
        let last_block = i_block + 1 == num_blocks;
        for (i_line, line) in block.iter().enumerate() {
            let symbol = match (i_line, block.len() == 1, last_block) {
                (0, true, true) => UP_AND_RIGHT,
                (0, _, _) => VERTICAL_AND_RIGHT,
                _ => VERTICAL,
            };
            log::log!(level, "{symbol} {line}");
        }
    }
    log::log!(level, "");
}

/// Groups of information lines printed under a bold title.
pub(crate) struct InfoPrinter {
    title: Cow<'static, str>,
    blocks: Vec<Block>,
}

impl InfoPrinter {
    pub(crate) fn new(title: Cow<'static, str>) -> Self {
        Self {
            title,
            blocks: vec![],
        }
    }

    pub(crate) fn push_line(&mut self, line: Cow<'static, str>) {
        self.blocks.push(vec![line]);
    }

    pub(crate) fn push_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub(crate) fn display(self) {
        log_tree(Level::Info, &self.title, &self.blocks);
    }
}

/// Something that can be reported as a warning once argument parsing is
/// done.
pub(crate) trait Warn {
    fn warn(self);
}

fn defer(block: Block) {
    match DEFERRED_WARNINGS.lock() {
        Ok(mut warnings) => warnings.push(block),
        // Another thread panicked while holding the lock; print straight away.
        Err(_) => block.iter().for_each(|line| log::warn!("{line}")),
    }
}

impl Warn for &'static str {
    fn warn(self) {
        defer(vec![self.into()]);
    }
}

impl Warn for String {
    fn warn(self) {
        defer(vec![self.into()]);
    }
}

impl Warn for Cow<'static, str> {
    fn warn(self) {
        defer(vec![self]);
    }
}

impl Warn for Vec<Cow<'static, str>> {
    fn warn(self) {
        defer(self);
    }
}

/// Print out any warnings that have been collected as CLI arguments have been
/// parsed, and forget them.
pub(crate) fn display_warnings() {
    log::debug!("Displaying warnings");
    let warnings = match DEFERRED_WARNINGS.lock() {
        Ok(mut warnings) => std::mem::take(&mut *warnings),
        Err(_) => return,
    };
    if !warnings.is_empty() {
        log_tree(Level::Warn, "Warnings", &warnings);
    }
}

