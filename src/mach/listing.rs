use crate::error;
use crate::lang::{Error, Line, LineNumber, MAX_LINE_NUMBER};
use std::collections::{BTreeMap, HashMap};
use std::ops::{Bound, RangeInclusive};
use std::sync::Arc;

/// ## Program store
///
/// Lines keyed and ordered by number. Cloning is cheap and gives a
/// snapshot; edits copy the map only while a snapshot is still alive.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Listing {
    source: Arc<BTreeMap<LineNumber, Line>>,
}

impl Listing {
    pub fn clear(&mut self) {
        self.source = Arc::default();
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn get(&self, number: LineNumber) -> Option<&Line> {
        self.source.get(&number)
    }

    pub fn insert(&mut self, line: Line) -> Option<Line> {
        Arc::make_mut(&mut self.source).insert(line.number(), line)
    }

    pub fn remove(&mut self, number: LineNumber) -> Option<Line> {
        if !self.source.contains_key(&number) {
            return None;
        }
        Arc::make_mut(&mut self.source).remove(&number)
    }

    /// Empty content deletes the line.
    pub fn set_line(&mut self, number: LineNumber, content: &str) {
        let line = Line::new(number, content);
        if line.is_empty() {
            self.remove(number);
        } else {
            self.insert(line);
        }
    }

    pub fn remove_range(&mut self, range: RangeInclusive<LineNumber>) -> bool {
        let to_remove = self
            .source
            .range(bounds(range))
            .map(|(k, _)| *k)
            .collect::<Vec<LineNumber>>();
        if to_remove.is_empty() {
            return false;
        }
        let source = Arc::make_mut(&mut self.source);
        for line_number in to_remove {
            source.remove(&line_number);
        }
        true
    }

    pub fn lines(&self) -> impl Iterator<Item = &Line> + Clone + '_ {
        self.source.values()
    }

    pub fn list(&self, range: RangeInclusive<LineNumber>) -> impl Iterator<Item = &Line> + Clone + '_ {
        self.source.range(bounds(range)).map(|(_, line)| line)
    }

    /// Text handed to the compiler.
    pub fn source(&self) -> String {
        self.lines()
            .map(|line| line.to_string())
            .collect::<Vec<String>>()
            .join("\n")
    }

    /// Used for loading a new Listing from a file.
    pub fn load_str(&mut self, line: &str) -> Result<(), Error> {
        if line.trim().is_empty() {
            return Ok(());
        }
        let line = Line::parse(line)?;
        if line.is_empty() {
            self.remove(line.number());
        } else {
            self.insert(line);
        }
        Ok(())
    }

    /// Renumber every line from `old_start` on, rewriting references to
    /// the moved lines everywhere in the program.
    pub fn renum(
        &mut self,
        new_start: LineNumber,
        increment: LineNumber,
        old_start: LineNumber,
    ) -> Result<(), Error> {
        if increment == 0 {
            return Err(error!(IllegalFunctionCall; "INCREMENT"));
        }
        let mut changes: HashMap<LineNumber, LineNumber> = HashMap::default();
        let mut old_end: Option<LineNumber> = None;
        let mut new_num = new_start;
        for &ln in self.source.keys() {
            if ln < old_start {
                old_end = Some(ln);
                continue;
            }
            if let Some(old_end) = old_end {
                if old_end >= new_start {
                    return Err(error!(IllegalFunctionCall; "LINES WOULD REORDER"));
                }
            }
            if new_num > MAX_LINE_NUMBER {
                return Err(error!(Overflow));
            }
            changes.insert(ln, new_num);
            new_num = match new_num.checked_add(increment) {
                Some(num) => num,
                None => return Err(error!(Overflow)),
            };
        }
        let mut new_source: BTreeMap<LineNumber, Line> = BTreeMap::default();
        for line in self.lines() {
            let line = line.renum(&changes);
            new_source.insert(line.number(), line);
        }
        self.source = Arc::new(new_source);
        Ok(())
    }
}

/// A reversed range selects nothing instead of panicking in `BTreeMap::range`.
fn bounds(range: RangeInclusive<LineNumber>) -> (Bound<LineNumber>, Bound<LineNumber>) {
    let (start, end) = range.into_inner();
    if start > end {
        (Bound::Included(start), Bound::Excluded(start))
    } else {
        (Bound::Included(start), Bound::Included(end))
    }
}

impl std::fmt::Display for Listing {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for line in self.lines() {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
