//! Layout, diffing and drawing for the battery screen.
//!
//! - [`RowLayout`] turns a snapshot into a [`Frame`] using the configured sections.
//! - [`diff_rows`] compares two frames row by row, so only changed rows need
//!   to be redrawn.
//! - [`render_list`] writes a frame as an aligned vertical list.

use devinfo_config::DisplayConfig;
use devinfo_core::{BatteryReading, LabeledEntry, Section};
use std::io::{self, Write};

/// Which sections appear on the screen, top to bottom.
#[derive(Debug, Default)]
pub struct RowLayout {
    sections: Vec<(Option<String>, Box<dyn Section>)>,
}

impl RowLayout {
    /// Build a [`RowLayout`] from the loaded configuration.  Unknown section
    /// kinds are skipped.
    pub fn from_config(config: &DisplayConfig) -> Self {
        Self {
            sections: config
                .sections
                .iter()
                .filter_map(|s| {
                    devinfo_widgets::section_for(&s.kind).map(|section| (s.label.clone(), section))
                })
                .collect(),
        }
    }

    /// Section ids in display order.
    pub fn ids(&self) -> Vec<&str> {
        self.sections.iter().map(|(_, s)| s.id()).collect()
    }

    /// Lay out `reading` into a frame.
    pub fn frame(&self, reading: &BatteryReading) -> Frame {
        Frame {
            blocks: self
                .sections
                .iter()
                .map(|(heading, section)| Block {
                    heading: heading.clone(),
                    rows:    section.rows(reading),
                })
                .collect(),
        }
    }
}

/// A fully laid-out screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub blocks: Vec<Block>,
}

/// One section's heading and rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub heading: Option<String>,
    pub rows:    Vec<LabeledEntry>,
}

impl Frame {
    /// All rows, in display order.
    pub fn rows(&self) -> impl Iterator<Item = &LabeledEntry> {
        self.blocks.iter().flat_map(|b| b.rows.iter())
    }

    /// Value of the first row labelled `label`.
    pub fn value(&self, label: &str) -> Option<&str> {
        self.rows().find(|r| r.label == label).map(|r| r.value.as_str())
    }
}

/// One row-level difference between two frames.  `index` is the row position
/// in the flattened list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowChange {
    Changed { index: usize, row: LabeledEntry },
    Added   { index: usize, row: LabeledEntry },
    Removed { index: usize, label: String },
}

/// Positional diff of `old` against `new`.
///
/// A row whose label matches at the same position but whose value differs is
/// `Changed`; a label mismatch is a `Removed` followed by an `Added`.
pub fn diff_rows(old: &Frame, new: &Frame) -> Vec<RowChange> {
    let old: Vec<&LabeledEntry> = old.rows().collect();
    let new: Vec<&LabeledEntry> = new.rows().collect();
    let mut changes = Vec::new();

    for index in 0..old.len().max(new.len()) {
        match (old.get(index), new.get(index)) {
            (Some(o), Some(n)) if o.label == n.label => {
                if o.value != n.value {
                    changes.push(RowChange::Changed { index, row: (*n).clone() });
                }
            }
            (Some(o), Some(n)) => {
                changes.push(RowChange::Removed { index, label: o.label.clone() });
                changes.push(RowChange::Added { index, row: (*n).clone() });
            }
            (Some(o), None) => changes.push(RowChange::Removed { index, label: o.label.clone() }),
            (None, Some(n)) => changes.push(RowChange::Added { index, row: (*n).clone() }),
            (None, None) => {}
        }
    }

    changes
}

/// Write `frame` as an aligned `label  value` list.
pub fn render_list(out: &mut impl Write, frame: &Frame) -> io::Result<()> {
    let width = frame.rows().map(|r| r.label.chars().count()).max().unwrap_or(0);

    for (i, block) in frame.blocks.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        if let Some(heading) = &block.heading {
            writeln!(out, "{heading}")?;
        }
        for row in &block.rows {
            writeln!(out, "{:<width$}  {}", row.label, row.value)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use devinfo_config::SectionConfig;

    fn frame(rows: &[(&str, &str)]) -> Frame {
        Frame {
            blocks: vec![Block {
                heading: None,
                rows:    rows.iter().map(|(l, v)| LabeledEntry::new(*l, *v)).collect(),
            }],
        }
    }

    #[test]
    fn layout_skips_unknown_kinds() {
        let cfg = DisplayConfig {
            sections: vec![
                SectionConfig::new("summary"),
                SectionConfig::new("bogus"),
                SectionConfig::new("details"),
            ],
            ..Default::default()
        };
        assert_eq!(RowLayout::from_config(&cfg).ids(), vec!["summary", "details"]);
    }

    #[test]
    fn identical_frames_have_no_changes() {
        let f = frame(&[("Health", "Good"), ("Level", "50%")]);
        assert!(diff_rows(&f, &f.clone()).is_empty());
    }

    #[test]
    fn only_changed_values_are_reported() {
        let old = frame(&[("Technology", "Li-ion"), ("Current (Real-time)", "400 mA")]);
        let new = frame(&[("Technology", "Li-ion"), ("Current (Real-time)", "410 mA")]);
        assert_eq!(
            diff_rows(&old, &new),
            vec![RowChange::Changed {
                index: 1,
                row:   LabeledEntry::new("Current (Real-time)", "410 mA"),
            }]
        );
    }

    #[test]
    fn added_and_removed_rows() {
        let old = frame(&[("A", "1"), ("B", "2")]);
        let new = frame(&[("A", "1"), ("C", "3"), ("D", "4")]);
        assert_eq!(
            diff_rows(&old, &new),
            vec![
                RowChange::Removed { index: 1, label: "B".into() },
                RowChange::Added { index: 1, row: LabeledEntry::new("C", "3") },
                RowChange::Added { index: 2, row: LabeledEntry::new("D", "4") },
            ]
        );
    }

    #[test]
    fn render_aligns_values() {
        let mut f = frame(&[("Level", "50%"), ("Power Source", "USB Port")]);
        f.blocks[0].heading = Some("Battery".into());

        let mut out = Vec::new();
        render_list(&mut out, &f).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Battery\nLevel         50%\nPower Source  USB Port\n"
        );
    }
}
