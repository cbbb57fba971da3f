//! Homopolymer tract detection.
//!
//! A tract is a maximal run of the target residue at least `min_run` long.
//! With single breaks allowed, the run may swallow one foreign residue when
//! it is directly followed by at least one more target residue, so `Q5HQ6`
//! is one tract of length 12 rather than a tract of 5 and a tract of 6.
//! Tracts never overlap and are reported left to right.

use std::fmt;

use crate::{Error, ErrorKind, Result};

/// What to look for, fixed for a whole batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TractPattern {
    target: u8,
    min_run: usize,
    allow_single_break: bool,
}

impl TractPattern {
    /// Build a pattern. The target must be a single ASCII letter and the
    /// minimum run at least one residue.
    pub fn new(target: char, min_run: usize, allow_single_break: bool) -> Result<TractPattern> {
        if !target.is_ascii_alphabetic() {
            return Err(Error::new(ErrorKind::InvalidPattern(format!(
                "target residue must be an ASCII letter, got {:?}",
                target
            ))));
        }
        if min_run == 0 {
            return Err(Error::new(ErrorKind::InvalidPattern(
                "minimum run length must be at least 1".into(),
            )));
        }
        Ok(TractPattern {
            target: target as u8,
            min_run,
            allow_single_break,
        })
    }

    pub fn target(&self) -> char {
        self.target as char
    }

    pub fn min_run(&self) -> usize {
        self.min_run
    }

    pub fn allow_single_break(&self) -> bool {
        self.allow_single_break
    }

    /// Lazily iterate over the tracts of `sequence`.
    pub fn find_iter<'s>(&self, sequence: &'s str) -> Tracts<'s> {
        Tracts {
            pattern: *self,
            sequence,
            pos: 0,
        }
    }

    /// Collect every tract of `sequence`.
    pub fn scan(&self, sequence: &str) -> Vec<Tract> {
        self.find_iter(sequence).collect()
    }
}

impl fmt::Display for TractPattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{{{},}}", self.target(), self.min_run)?;
        if self.allow_single_break {
            write!(f, " with one break")?;
        }
        Ok(())
    }
}

/// The single foreign residue inside a tract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Break {
    /// 1-based offset within the tract
    pub position: usize,
    pub residue: char,
}

/// Find the first residue of `tract` that is not `target`.
pub fn classify_break(tract: &str, target: char) -> Option<Break> {
    tract
        .chars()
        .enumerate()
        .find(|&(_, c)| c != target)
        .map(|(i, residue)| Break {
            position: i + 1,
            residue,
        })
}

/// One detected tract, not yet tied to a gene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tract {
    /// 0-based start, inclusive
    pub start: usize,
    /// 0-based end, exclusive
    pub end: usize,
    pub sequence: String,
    pub brk: Option<Break>,
    pub label: String,
}

impl Tract {
    fn new(sequence: &str, start: usize, end: usize, target: char) -> Tract {
        let tract = &sequence[start..end];
        let brk = classify_break(tract, target);
        let label = break_label(target, start, end, brk);
        Tract {
            start,
            end,
            sequence: tract.to_string(),
            brk,
            label,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// Summarise a tract as e.g. `Q10_1to11` or `Q5HQ6_0to12`.
pub fn break_label(target: char, start: usize, end: usize, brk: Option<Break>) -> String {
    let length = end - start;
    match brk {
        Some(Break { position, residue }) => format!(
            "{t}{}{}{t}{}_{}to{}",
            position - 1,
            residue,
            length - position,
            start,
            end,
            t = target
        ),
        None => format!("{}{}_{}to{}", target, length, start, end),
    }
}

/// Iterator over the tracts of one sequence.
pub struct Tracts<'s> {
    pattern: TractPattern,
    sequence: &'s str,
    pos: usize,
}

impl<'s> Tracts<'s> {
    fn run_end(&self, from: usize) -> usize {
        let bytes = self.sequence.as_bytes();
        let mut end = from;
        while end < bytes.len() && bytes[end] == self.pattern.target {
            end += 1;
        }
        end
    }
}

impl<'s> Iterator for Tracts<'s> {
    type Item = Tract;

    fn next(&mut self) -> Option<Tract> {
        let sequence = self.sequence;
        let bytes = sequence.as_bytes();
        let target = self.pattern.target;

        while self.pos < bytes.len() {
            if bytes[self.pos] != target {
                self.pos += 1;
                continue;
            }

            let start = self.pos;
            let mut end = self.run_end(start);
            if end - start < self.pattern.min_run {
                // no shorter suffix of this run can qualify either
                self.pos = end;
                continue;
            }

            // `end` sits on a foreign residue (or the end), never on the target
            if self.pattern.allow_single_break
                && end + 1 < bytes.len()
                && bytes[end].is_ascii()
                && bytes[end + 1] == target
            {
                end = self.run_end(end + 1);
            }

            self.pos = end;
            return Some(Tract::new(sequence, start, end, self.pattern.target()));
        }
        None
    }
}
