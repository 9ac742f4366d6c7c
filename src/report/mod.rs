//! Narrative report assembly.
//!
//! A report is built by a [`ReportBuilder`]: an ordered list of section
//! functions, each given read-only access to a context value. Rendering runs
//! them in order and stops at the first failed lookup, so a missing column
//! surfaces as an error instead of a blank paragraph.

pub mod markdown;
pub mod templates;

pub use templates::{
    Collection, CourseContext, SkippedSheet, TemplateKind, UniversityDetails, collections_from_workbook,
    validate_course_details,
};

use crate::error::DataResult;

/// Body content of a section.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(String),
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

/// A `##` heading followed by its blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub heading: String,
    pub blocks: Vec<Block>,
}

impl Section {
    pub fn new(heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            blocks: Vec::new(),
        }
    }

    pub fn paragraph(mut self, text: impl Into<String>) -> Self {
        self.blocks.push(Block::Paragraph(text.into()));
        self
    }

    pub fn table(mut self, headers: &[&str], rows: Vec<Vec<String>>) -> Self {
        self.blocks.push(Block::Table {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
        });
        self
    }
}

/// A rendered report.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub title: String,
    pub sections: Vec<Section>,
}

impl Report {
    /// Markdown text: `# title`, then `## heading` per section, blocks
    /// separated by blank lines.
    pub fn to_markdown(&self) -> String {
        let mut parts = vec![format!("# {}", self.title)];
        for section in &self.sections {
            parts.push(format!("## {}", section.heading));
            for block in &section.blocks {
                match block {
                    Block::Paragraph(text) => parts.push(text.clone()),
                    Block::Table { headers, rows } => {
                        parts.push(markdown::markdown_table(headers, rows))
                    }
                }
            }
        }
        let mut out = parts.join("\n\n");
        out.push('\n');
        out
    }
}

type TitleFn<C> = Box<dyn Fn(&C) -> DataResult<String>>;
type SectionFn<C> = Box<dyn Fn(&C) -> DataResult<Vec<Section>>>;

/// Ordered list of section producers over a context `C`.
pub struct ReportBuilder<C> {
    title: TitleFn<C>,
    sections: Vec<SectionFn<C>>,
}

impl<C> ReportBuilder<C> {
    pub fn new(title: impl Fn(&C) -> DataResult<String> + 'static) -> Self {
        Self {
            title: Box::new(title),
            sections: Vec::new(),
        }
    }

    /// Append a producer of exactly one section.
    pub fn section(mut self, f: impl Fn(&C) -> DataResult<Section> + 'static) -> Self {
        self.sections.push(Box::new(move |ctx| f(ctx).map(|s| vec![s])));
        self
    }

    /// Append a producer of any number of sections (one per collection sheet,
    /// for instance).
    pub fn sections(mut self, f: impl Fn(&C) -> DataResult<Vec<Section>> + 'static) -> Self {
        self.sections.push(Box::new(f));
        self
    }

    pub fn render(&self, ctx: &C) -> DataResult<Report> {
        let title = (self.title)(ctx)?;
        let mut sections = Vec::new();
        for producer in &self.sections {
            sections.extend(producer(ctx)?);
        }
        log::debug!("Rendered report '{title}' with {} sections", sections.len());
        Ok(Report { title, sections })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CellValue, Table};
    use crate::error::DataError;

    fn table() -> Table {
        Table::new(
            vec!["Course Name".into(), "Fees".into()],
            vec![vec!["MS CS".into(), CellValue::Number(100.0)]],
        )
        .unwrap()
    }

    #[test]
    fn sections_render_in_order() {
        let builder = ReportBuilder::new(|t: &Table| Ok(t.row(0).unwrap().get("Course Name")?.to_string()))
            .section(|t: &Table| {
                let fees = t.row(0).unwrap().get("Fees")?;
                Ok(Section::new("Cost").paragraph(format!("Fees are {fees}.")))
            })
            .sections(|_| Ok(vec![Section::new("A"), Section::new("B")]));

        let report = builder.render(&table()).unwrap();
        let headings: Vec<&str> = report.sections.iter().map(|s| s.heading.as_str()).collect();
        assert_eq!(headings, vec!["Cost", "A", "B"]);
        assert_eq!(
            report.to_markdown(),
            "# MS CS\n\n## Cost\n\nFees are 100.\n\n## A\n\n## B\n"
        );
    }

    #[test]
    fn missing_field_fails_the_render() {
        let builder = ReportBuilder::new(|_: &Table| Ok("T".to_string())).section(|t: &Table| {
            let v = t.row(0).unwrap().get("Top Employers")?;
            Ok(Section::new("Jobs").paragraph(v.to_string()))
        });
        assert_eq!(
            builder.render(&table()).unwrap_err(),
            DataError::MissingColumn("Top Employers".into())
        );
    }

    #[test]
    fn tables_render_as_pipe_tables() {
        let report = Report {
            title: "T".into(),
            sections: vec![Section::new("S").table(&["A", "B"], vec![vec!["1".into(), "2".into()]])],
        };
        assert!(report.to_markdown().contains("| A | B |\n| --- | --- |\n| 1 | 2 |"));
    }
}
