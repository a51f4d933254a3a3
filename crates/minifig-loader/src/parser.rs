//! Parents file parser.
//!
//! Parsing runs in two passes. [`LineClassifier`] tags every non-blank line
//! as a header, an attach point or an entry. [`ParentsParser`] folds the
//! tagged lines into blocks with an `Outside` / `InGroup` / `InParent` state
//! machine, then resolves every entry against the complete set of group
//! names, so a group may be used before the block that defines it.

use std::collections::{HashMap, HashSet};
use std::iter::Enumerate;
use std::str::Lines;
use std::time::Instant;

use minifig_types::{AttachPoint, ChildRef, Group, ParentRecord, PartId, PartsTable};
use tracing::{debug, warn};

use crate::types::{DuplicatePolicy, HierarchyConfig, HierarchyError, HierarchyResult, ParseStats};

/// Keyword opening a group block.
pub const GROUP_KEYWORD: &str = "Group";

/// Keyword opening a parent block.
pub const PARENT_KEYWORD: &str = "Parent";

/// Classification of a single non-blank line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind<'a> {
    /// `Group <name>:`
    GroupHeader(&'a str),
    /// `Parent <id>:`
    ParentHeader(PartId),
    /// Three numeric tokens.
    Point(AttachPoint),
    /// One token: a part identifier or a group name.
    Entry(&'a str),
}

/// A classified line together with its position in the file.
#[derive(Debug, Clone, PartialEq)]
pub struct Line<'a> {
    /// 1-based line number.
    pub number: usize,
    /// The line as it appears in the file.
    pub raw: &'a str,
    /// What the line holds.
    pub kind: LineKind<'a>,
}

/// Iterator over the classified lines of a parents file.
///
/// Blank and comment-only lines are skipped; the first malformed line
/// yields an error.
pub struct LineClassifier<'a> {
    lines: Enumerate<Lines<'a>>,
    lines_read: usize,
    skipped: usize,
}

impl<'a> LineClassifier<'a> {
    /// Creates a classifier over the given text.
    pub fn new(text: &'a str) -> Self {
        // Handle UTF-8 BOM at start of file
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        Self {
            lines: text.lines().enumerate(),
            lines_read: 0,
            skipped: 0,
        }
    }

    /// Returns the number of lines read so far.
    pub fn lines_read(&self) -> usize {
        self.lines_read
    }

    /// Returns the number of blank or comment-only lines skipped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl<'a> Iterator for LineClassifier<'a> {
    type Item = HierarchyResult<Line<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (index, raw) = self.lines.next()?;
            self.lines_read += 1;
            let number = index + 1;

            match classify(number, raw) {
                Ok(Some(kind)) => return Some(Ok(Line { number, raw, kind })),
                Ok(None) => {
                    self.skipped += 1;
                    continue;
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Classifies one line.
///
/// Returns `Ok(None)` for blank and comment-only lines. Token count alone
/// separates data lines: three tokens are an attach point, one token is an
/// entry, anything else is malformed.
pub fn classify(number: usize, raw: &str) -> HierarchyResult<Option<LineKind<'_>>> {
    let data = parse::strip_comment(raw);
    if data.is_empty() {
        return Ok(None);
    }

    if let Some(rest) = parse::header_rest(data, GROUP_KEYWORD) {
        let name = parse::header_name(number, raw, rest)?;
        if PartId::is_valid(name) {
            return Err(HierarchyError::format(
                number,
                raw,
                format!("group name '{name}' is indistinguishable from a part identifier"),
            ));
        }
        return Ok(Some(LineKind::GroupHeader(name)));
    }

    if let Some(rest) = parse::header_rest(data, PARENT_KEYWORD) {
        let name = parse::header_name(number, raw, rest)?;
        let id = PartId::new(name).map_err(|e| HierarchyError::format(number, raw, e.to_string()))?;
        return Ok(Some(LineKind::ParentHeader(id)));
    }

    let tokens: Vec<&str> = data.split_whitespace().collect();
    match tokens.as_slice() {
        [token] => Ok(Some(LineKind::Entry(*token))),
        [x, y, z] => Ok(Some(LineKind::Point(AttachPoint::new(
            parse::coordinate(number, raw, x)?,
            parse::coordinate(number, raw, y)?,
            parse::coordinate(number, raw, z)?,
        )))),
        _ => Err(HierarchyError::format(
            number,
            raw,
            format!(
                "expected three coordinates or one identifier, found {} tokens",
                tokens.len()
            ),
        )),
    }
}

/// An entry line waiting for group names to be known.
#[derive(Debug)]
struct RawEntry<'a> {
    line: usize,
    raw: &'a str,
    token: &'a str,
}

/// A block collected by the first pass.
#[derive(Debug)]
struct RawBlock<'a> {
    name: String,
    points: Vec<AttachPoint>,
    entries: Vec<RawEntry<'a>>,
}

impl RawBlock<'_> {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            points: Vec::new(),
            entries: Vec::new(),
        }
    }
}

enum BlockState<'a> {
    Outside,
    InGroup(RawBlock<'a>),
    InParent(PartId, RawBlock<'a>),
}

/// Blocks collected by the first pass, in file order.
#[derive(Default)]
struct RawTable<'a> {
    groups: Vec<RawBlock<'a>>,
    parents: Vec<(PartId, RawBlock<'a>)>,
}

impl<'a> RawTable<'a> {
    fn finish(&mut self, state: BlockState<'a>) {
        match state {
            BlockState::Outside => {}
            BlockState::InGroup(block) => self.groups.push(block),
            BlockState::InParent(id, block) => self.parents.push((id, block)),
        }
    }
}

/// Parser for parents files.
///
/// # Example
///
/// ```
/// use minifig_loader::{HierarchyConfig, ParentsParser};
///
/// let text = "Parent 975:\n-22 16.1213 20.8787\n977\n";
/// let mut parser = ParentsParser::new(HierarchyConfig::default());
/// let table = parser.parse(text).unwrap();
///
/// assert_eq!(table.parents.len(), 1);
/// assert_eq!(parser.stats().attach_point_count, 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ParentsParser {
    config: HierarchyConfig,
    stats: ParseStats,
}

impl ParentsParser {
    /// Creates a new parser with the given configuration.
    pub fn new(config: HierarchyConfig) -> Self {
        Self {
            config,
            stats: ParseStats::default(),
        }
    }

    /// Returns the parser configuration.
    pub fn config(&self) -> &HierarchyConfig {
        &self.config
    }

    /// Returns statistics of the last successful parse.
    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }

    /// Parses the full text of a parents file.
    ///
    /// Fails on the first malformed line; no partial table is returned.
    pub fn parse(&mut self, text: &str) -> HierarchyResult<PartsTable> {
        let start = Instant::now();
        let mut stats = ParseStats::default();

        let raw = Self::collect_blocks(text, &mut stats)?;
        let table = self.build_table(raw, &mut stats)?;

        stats.parse_time_ms = start.elapsed().as_millis() as u64;
        debug!(
            groups = stats.group_count,
            parents = stats.parent_count,
            attach_points = stats.attach_point_count,
            entries = stats.entry_count,
            "parsed parents table"
        );
        self.stats = stats;
        Ok(table)
    }

    /// First pass: fold classified lines into raw blocks.
    fn collect_blocks<'a>(text: &'a str, stats: &mut ParseStats) -> HierarchyResult<RawTable<'a>> {
        let mut classifier = LineClassifier::new(text);
        let mut raw = RawTable::default();
        let mut state = BlockState::Outside;
        let mut group_lines: HashMap<String, usize> = HashMap::new();
        let mut parent_lines: HashMap<PartId, usize> = HashMap::new();

        for line in classifier.by_ref() {
            let line = line?;
            match line.kind {
                LineKind::GroupHeader(name) => {
                    if let Some(first) = group_lines.insert(name.to_string(), line.number) {
                        return Err(HierarchyError::format(
                            line.number,
                            line.raw,
                            format!("duplicate group '{name}' (first declared on line {first})"),
                        ));
                    }
                    raw.finish(std::mem::replace(
                        &mut state,
                        BlockState::InGroup(RawBlock::new(name)),
                    ));
                }
                LineKind::ParentHeader(id) => {
                    if let Some(first) = parent_lines.insert(id.clone(), line.number) {
                        return Err(HierarchyError::format(
                            line.number,
                            line.raw,
                            format!("duplicate parent '{id}' (first declared on line {first})"),
                        ));
                    }
                    let block = RawBlock::new(id.as_str());
                    raw.finish(std::mem::replace(&mut state, BlockState::InParent(id, block)));
                }
                LineKind::Point(point) => match &mut state {
                    BlockState::InParent(_, block) => {
                        block.points.push(point);
                        stats.attach_point_count += 1;
                    }
                    BlockState::InGroup(block) => {
                        return Err(HierarchyError::format(
                            line.number,
                            line.raw,
                            format!("attach point inside group '{}'", block.name),
                        ));
                    }
                    BlockState::Outside => {
                        return Err(HierarchyError::format(
                            line.number,
                            line.raw,
                            "attach point outside of a Parent block",
                        ));
                    }
                },
                LineKind::Entry(token) => {
                    let entry = RawEntry {
                        line: line.number,
                        raw: line.raw,
                        token,
                    };
                    match &mut state {
                        BlockState::InGroup(block) | BlockState::InParent(_, block) => {
                            block.entries.push(entry);
                            stats.entry_count += 1;
                        }
                        BlockState::Outside => {
                            return Err(HierarchyError::format(
                                line.number,
                                line.raw,
                                "entry outside of a Group or Parent block",
                            ));
                        }
                    }
                }
            }
        }
        raw.finish(state);

        stats.total_lines = classifier.lines_read();
        stats.skipped_lines = classifier.skipped();
        stats.group_count = raw.groups.len();
        stats.parent_count = raw.parents.len();
        Ok(raw)
    }

    /// Second pass: resolve entries now that every group name is known.
    fn build_table(&self, raw: RawTable<'_>, stats: &mut ParseStats) -> HierarchyResult<PartsTable> {
        let group_names: HashSet<&str> = raw.groups.iter().map(|g| g.name.as_str()).collect();
        let mut table = PartsTable::new();

        for block in &raw.groups {
            let members = self.resolve_entries(block, &group_names, stats)?;
            table.groups.insert(
                block.name.clone(),
                Group {
                    name: block.name.clone(),
                    members,
                },
            );
        }

        for (id, block) in &raw.parents {
            let children = self.resolve_entries(block, &group_names, stats)?;
            table.parents.insert(
                id.clone(),
                ParentRecord {
                    id: id.clone(),
                    attach_points: block.points.clone(),
                    children,
                },
            );
        }

        Ok(table)
    }

    fn resolve_entries(
        &self,
        block: &RawBlock<'_>,
        group_names: &HashSet<&str>,
        stats: &mut ParseStats,
    ) -> HierarchyResult<Vec<ChildRef>> {
        let mut seen = HashSet::new();
        let mut resolved = Vec::with_capacity(block.entries.len());

        for entry in &block.entries {
            let child = if group_names.contains(entry.token) {
                ChildRef::Group(entry.token.to_string())
            } else {
                let id = PartId::new(entry.token).map_err(|_| {
                    HierarchyError::format(
                        entry.line,
                        entry.raw,
                        format!(
                            "'{}' is neither a part identifier nor a defined group",
                            entry.token
                        ),
                    )
                })?;
                ChildRef::Part(id)
            };

            if !seen.insert(child.clone()) {
                stats.duplicate_entries += 1;
                if self.config.duplicates == DuplicatePolicy::Warn {
                    warn!(
                        line = entry.line,
                        block = %block.name,
                        entry = entry.token,
                        "duplicate entry"
                    );
                }
            }
            resolved.push(child);
        }

        Ok(resolved)
    }
}

/// Parses a parents file with the default configuration.
pub fn parse_table(text: &str) -> HierarchyResult<PartsTable> {
    ParentsParser::default().parse(text)
}

/// Helper functions for lexing parents file lines.
pub mod parse {
    use super::{HierarchyError, HierarchyResult};

    /// Removes a trailing `#` comment and surrounding whitespace.
    pub fn strip_comment(line: &str) -> &str {
        line.split('#').next().unwrap_or("").trim()
    }

    /// Returns the text after `keyword` if `data` starts with it as a word.
    ///
    /// The keyword must be followed by whitespace, a colon, or nothing.
    pub fn header_rest<'a>(data: &'a str, keyword: &str) -> Option<&'a str> {
        let rest = data.strip_prefix(keyword)?;
        match rest.chars().next() {
            None => Some(rest),
            Some(c) if c.is_whitespace() || c == ':' => Some(rest),
            Some(_) => None,
        }
    }

    /// Extracts the identifier from the text following a header keyword.
    ///
    /// The text must be a single token terminated by a colon.
    pub fn header_name<'a>(number: usize, raw: &str, rest: &'a str) -> HierarchyResult<&'a str> {
        let rest = rest.trim();
        let name = rest
            .strip_suffix(':')
            .ok_or_else(|| HierarchyError::format(number, raw, "header is missing its colon"))?
            .trim();

        if name.is_empty() {
            return Err(HierarchyError::format(
                number,
                raw,
                "header is missing its identifier",
            ));
        }
        if name.split_whitespace().nth(1).is_some() {
            return Err(HierarchyError::format(
                number,
                raw,
                "header identifier must be a single token",
            ));
        }
        Ok(name)
    }

    /// Returns true if `value` is a plain signed decimal number.
    ///
    /// Accepts `12`, `-22`, `+1.5`, `16.`, `.5`; rejects exponents,
    /// `inf`, `nan` and part identifier prefixes.
    pub fn is_decimal(value: &str) -> bool {
        let unsigned = value
            .strip_prefix('-')
            .or_else(|| value.strip_prefix('+'))
            .unwrap_or(value);

        let (int_part, frac_part) = match unsigned.split_once('.') {
            Some((int_part, frac_part)) => (int_part, Some(frac_part)),
            None => (unsigned, None),
        };

        let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if !all_digits(int_part) {
            return false;
        }
        match frac_part {
            None => !int_part.is_empty(),
            Some(frac) => all_digits(frac) && !(int_part.is_empty() && frac.is_empty()),
        }
    }

    /// Parses one attach point component.
    pub fn coordinate(number: usize, raw: &str, value: &str) -> HierarchyResult<f64> {
        let invalid =
            || HierarchyError::format(number, raw, format!("invalid coordinate '{value}'"));
        if !is_decimal(value) {
            return Err(invalid());
        }
        value.parse::<f64>().map_err(|_| invalid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = include_str!("../data/parents.txt");

    fn part(id: &str) -> PartId {
        PartId::new(id).unwrap()
    }

    #[test]
    fn test_strip_comment() {
        assert_eq!(parse::strip_comment("  3626   # Head"), "3626");
        assert_eq!(parse::strip_comment("# whole line"), "");
        assert_eq!(parse::strip_comment("   "), "");
    }

    #[test]
    fn test_is_decimal() {
        for ok in ["0", "-22", "+1.5", "16.1213", "16.", ".5", "-.5"] {
            assert!(parse::is_decimal(ok), "{ok}");
        }
        for bad in ["", "-", ".", "1e5", "inf", "NaN", "~12", "u12", "1.2.3", "12a"] {
            assert!(!parse::is_decimal(bad), "{bad}");
        }
    }

    #[test]
    fn test_header_rest_requires_word_boundary() {
        assert_eq!(parse::header_rest("Parent 973:", "Parent"), Some(" 973:"));
        assert_eq!(parse::header_rest("Parent", "Parent"), Some(""));
        assert_eq!(parse::header_rest("Parents", "Parent"), None);
        assert_eq!(parse::header_rest("GroupHair", "Group"), None);
    }

    #[test]
    fn test_classify_kinds() {
        assert_eq!(classify(1, "").unwrap(), None);
        assert_eq!(classify(1, "   # note").unwrap(), None);
        assert_eq!(
            classify(1, "Group MinifigHair:  # hair").unwrap(),
            Some(LineKind::GroupHeader("MinifigHair"))
        );
        assert_eq!(
            classify(1, "Parent 973 :").unwrap(),
            Some(LineKind::ParentHeader(part("973")))
        );
        assert_eq!(
            classify(1, "  -22   16.1213 20.8787   # wrist").unwrap(),
            Some(LineKind::Point(AttachPoint::new(-22.0, 16.1213, 20.8787)))
        );
        assert_eq!(
            classify(1, "~3901 # obsolete").unwrap(),
            Some(LineKind::Entry("~3901"))
        );
    }

    #[test]
    fn test_classify_malformed_headers() {
        let err = classify(4, "Parent 973").unwrap_err();
        assert_eq!(err.line(), Some(4));
        assert!(err.to_string().contains("colon"));

        assert!(classify(1, "Parent :").is_err());
        assert!(classify(1, "Group:").is_err());
        assert!(classify(1, "Group Two Words:").is_err());
        assert!(classify(1, "Parent Head:").is_err());
        assert!(classify(1, "Group 3626:").is_err());
    }

    #[test]
    fn test_classify_bad_token_counts() {
        let err = classify(9, "12 34").unwrap_err();
        match err {
            HierarchyError::Format { line, content, .. } => {
                assert_eq!(line, 9);
                assert_eq!(content, "12 34");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(classify(1, "1 2 3 4").is_err());
        assert!(classify(1, "1 2 ~3").is_err());
        assert!(classify(1, "3626 3626b 3626c").is_err());
    }

    #[test]
    fn test_classifier_counts_lines() {
        let text = "\u{feff}# comment\n\nParent 975:\n-22 16.1213 20.8787\n977\n";
        let mut classifier = LineClassifier::new(text);
        let lines: Vec<_> = classifier.by_ref().collect::<Result<_, _>>().unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].number, 3);
        assert_eq!(classifier.lines_read(), 5);
        assert_eq!(classifier.skipped(), 2);
    }

    #[test]
    fn test_parse_sample() {
        let mut parser = ParentsParser::default();
        let table = parser.parse(SAMPLE).unwrap();

        assert_eq!(table.groups.len(), 7);
        assert_eq!(table.parents.len(), 6);

        let arm = table.parent("975").unwrap();
        assert_eq!(arm.attach_points, vec![AttachPoint::new(-22.0, 16.1213, 20.8787)]);
        assert_eq!(arm.children, vec![ChildRef::Group("MinifigHands".into())]);

        let stats = parser.stats();
        assert_eq!(stats.group_count, 7);
        assert_eq!(stats.parent_count, 6);
        assert_eq!(stats.duplicate_entries, 1);
        assert!(stats.skipped_lines > 0);
    }

    #[test]
    fn test_parse_is_idempotent() {
        assert_eq!(parse_table(SAMPLE).unwrap(), parse_table(SAMPLE).unwrap());
    }

    #[test]
    fn test_forward_group_reference() {
        let text = "Parent 3626:\n0 0 0\nHair\n\nGroup Hair:\n3901\n";
        let table = parse_table(text).unwrap();
        assert_eq!(
            table.parent("3626").unwrap().children,
            vec![ChildRef::Group("Hair".into())]
        );
    }

    #[test]
    fn test_empty_blocks_allowed() {
        let table = parse_table("Group Empty:\nParent 973:\n").unwrap();
        assert!(table.group("Empty").unwrap().members.is_empty());
        assert!(table.parent("973").unwrap().attach_points.is_empty());
    }

    #[test]
    fn test_duplicate_group_rejected() {
        let text = "Group Hair:\n3901\nGroup Hair:\n6093\n";
        let err = parse_table(text).unwrap_err();
        assert_eq!(err.line(), Some(3));
        assert!(err.to_string().contains("first declared on line 1"));
    }

    #[test]
    fn test_duplicate_parent_rejected() {
        let text = "Parent 973:\n3626\n\nParent 973:\n970\n";
        assert_eq!(parse_table(text).unwrap_err().line(), Some(4));
    }

    #[test]
    fn test_unknown_group_rejected() {
        let text = "Parent 3626:\n0 0 0\nMinifigHair\n";
        let err = parse_table(text).unwrap_err();
        assert_eq!(err.line(), Some(3));
        assert!(err.to_string().contains("MinifigHair"));
    }

    #[test]
    fn test_data_outside_block_rejected() {
        assert_eq!(parse_table("3626\n").unwrap_err().line(), Some(1));
        assert_eq!(parse_table("# x\n0 0 0\n").unwrap_err().line(), Some(2));
    }

    #[test]
    fn test_attach_point_in_group_rejected() {
        let err = parse_table("Group Hair:\n0 0 0\n").unwrap_err();
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn test_two_token_line_rejected() {
        let text = "Parent 975:\n-22 16.1213\n977\n";
        let err = parse_table(text).unwrap_err();
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn test_duplicates_kept_in_raw_table() {
        let text = "Group FriendsHair:\n92254\n15284\n92254\n";
        let mut parser = ParentsParser::new(HierarchyConfig::strict());
        let table = parser.parse(text).unwrap();
        assert_eq!(table.group("FriendsHair").unwrap().members.len(), 3);
        assert_eq!(parser.stats().duplicate_entries, 1);
    }
}
