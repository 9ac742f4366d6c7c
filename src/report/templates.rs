use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::clean::coerce_numeric;
use crate::data::filter::{FilterCriteria, filtered_indices};
use crate::data::{CellValue, Row, Table, Workbook};
use crate::error::{DataError, DataResult};

use super::markdown::{bold, inline, link};
use super::{ReportBuilder, Section};

// ---------------------------------------------------------------------------
// Input contracts
// ---------------------------------------------------------------------------

pub const COURSE_NAME: &str = "Course Name";
pub const COUNTRY: &str = "Country";
pub const UNIVERSITY_NAME: &str = "University Name";

pub const COURSE_DETAILS_COLUMNS: &[&str] = &[
    COURSE_NAME,
    COUNTRY,
    UNIVERSITY_NAME,
    "Tuition Fees (INR)",
    "Living Expenses (INR)",
];

pub const COLLECTION_COLUMNS: &[&str] = &[
    COURSE_NAME,
    COUNTRY,
    "Collection Name",
    UNIVERSITY_NAME,
    "Tuition Fees",
    "Acceptance Rate",
    "Application Link",
    "Ranking",
    "Agency Name",
    "Stream",
];

pub const DETAIL_SHEETS: &[&str] = &["Tuition Fees", "Living Expenses", "Important Deadlines"];

const TUITION_COLUMN: &str = "Tuition Fees (INR)";
const MONTHLY_COST: &str = "Monthly Cost (INR)";
const ANNUAL_COST: &str = "Annual Cost (INR)";

/// Check the fixed column names a course details sheet must carry.
pub fn validate_course_details(table: &Table) -> DataResult<()> {
    table.require_columns(COURSE_DETAILS_COLUMNS)
}

/// One sheet of a collection workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub sheet_name: String,
    pub description: String,
    pub table: Table,
}

/// A collection sheet left out because it lacks required columns.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSheet {
    pub sheet_name: String,
    pub missing: Vec<String>,
}

/// Split a collection workbook into usable sheets and skipped ones.
pub fn collections_from_workbook(workbook: &Workbook) -> (Vec<Collection>, Vec<SkippedSheet>) {
    let mut collections = Vec::new();
    let mut skipped = Vec::new();
    for sheet in &workbook.sheets {
        let missing: Vec<String> = COLLECTION_COLUMNS
            .iter()
            .filter(|c| !sheet.table.has_column(c))
            .map(|c| c.to_string())
            .collect();
        if missing.is_empty() {
            collections.push(Collection {
                sheet_name: sheet.name.clone(),
                description: String::new(),
                table: sheet.table.clone(),
            });
        } else {
            log::warn!(
                "Collection sheet '{}' skipped, missing columns: {}",
                sheet.name,
                missing.join(", ")
            );
            skipped.push(SkippedSheet {
                sheet_name: sheet.name.clone(),
                missing,
            });
        }
    }
    (collections, skipped)
}

/// The three sheets of a university details workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct UniversityDetails {
    pub tuition: Table,
    pub living: Table,
    pub deadlines: Table,
    living_column: &'static str,
}

impl UniversityDetails {
    /// Validate the workbook and coerce the cost columns to numbers.
    pub fn from_workbook(workbook: &Workbook) -> DataResult<Self> {
        workbook.require_sheets(DETAIL_SHEETS)?;

        let tuition = workbook.sheet("Tuition Fees")?;
        tuition.require_column(TUITION_COLUMN)?;

        let living = workbook.sheet("Living Expenses")?;
        let living_column = if living.has_column(MONTHLY_COST) {
            MONTHLY_COST
        } else if living.has_column(ANNUAL_COST) {
            ANNUAL_COST
        } else {
            return Err(DataError::MissingColumns(vec![
                MONTHLY_COST.to_string(),
                ANNUAL_COST.to_string(),
            ]));
        };

        Ok(Self {
            tuition: coerce_numeric(tuition, &[TUITION_COLUMN])?.table,
            living: coerce_numeric(living, &[living_column])?.table,
            deadlines: workbook.sheet("Important Deadlines")?.clone(),
            living_column,
        })
    }

    pub fn total_tuition(&self) -> f64 {
        self.tuition.sum(TUITION_COLUMN).unwrap_or(0.0)
    }

    pub fn total_living(&self) -> f64 {
        self.living.sum(self.living_column).unwrap_or(0.0)
    }
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Everything a course template reads. The selected course row is looked up
/// once; sections only borrow.
pub struct CourseContext<'a> {
    pub course_name: String,
    pub country: String,
    pub course: Row<'a>,
    pub details: Option<&'a UniversityDetails>,
    pub collections: &'a [Collection],
}

impl<'a> CourseContext<'a> {
    /// Select the first course details row for `course_name` in `country`.
    /// No such row is an `EmptyResult`.
    pub fn select(
        course_details: &'a Table,
        course_name: &CellValue,
        country: &CellValue,
        details: Option<&'a UniversityDetails>,
        collections: &'a [Collection],
    ) -> DataResult<Self> {
        let criteria = FilterCriteria::new()
            .where_eq(COURSE_NAME, course_name.clone())
            .where_eq(COUNTRY, country.clone());
        let first = filtered_indices(course_details, &criteria)?
            .first()
            .copied()
            .ok_or_else(|| DataError::EmptyResult(criteria.to_string()))?;
        let course = course_details
            .row(first)
            .ok_or_else(|| DataError::EmptyResult(criteria.to_string()))?;

        Ok(Self {
            course_name: course_name.to_string(),
            country: country.to_string(),
            course,
            details,
            collections,
        })
    }

    /// A field of the selected course, kept on one line; absent columns are
    /// errors, missing values read as `N/A`.
    fn field(&self, column: &str) -> DataResult<String> {
        Ok(inline(&self.course.get(column)?.display_or("N/A")))
    }
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

/// The report configurations on offer. Each is a complete template on its
/// own; they share section functions but are not layered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    /// Overview and job prospects only.
    Overview,
    /// Overview, costs, deadlines, collections and job prospects.
    #[default]
    Full,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 2] = [TemplateKind::Overview, TemplateKind::Full];

    pub fn label(self) -> &'static str {
        match self {
            TemplateKind::Overview => "Overview",
            TemplateKind::Full => "Full report with rankings",
        }
    }

    pub fn builder<'a>(self) -> ReportBuilder<CourseContext<'a>> {
        match self {
            TemplateKind::Overview => ReportBuilder::new(title)
                .section(overview)
                .section(job_prospects),
            TemplateKind::Full => ReportBuilder::new(title)
                .section(overview)
                .section(costs)
                .section(deadlines)
                .sections(collections)
                .section(job_prospects),
        }
    }
}

fn title(ctx: &CourseContext<'_>) -> DataResult<String> {
    Ok(format!("{} in {}", ctx.course_name, ctx.country))
}

fn overview(ctx: &CourseContext<'_>) -> DataResult<Section> {
    let specializations = ctx.field("Top Specializations")?;
    let university = ctx.field(UNIVERSITY_NAME)?;
    let video = ctx.field("Relevant YouTube Video URL")?;
    Ok(Section::new("Overview")
        .paragraph(format!(
            "The {course} in {country} is a prestigious degree attracting international students. \
             Top specializations include {specializations}, and universities like {university} \
             are renowned for their research opportunities.",
            course = ctx.course_name,
            country = ctx.country,
        ))
        .paragraph(format!(
            "You can watch this video for more information: {}",
            link("Watch Video", &video)
        )))
}

fn costs(ctx: &CourseContext<'_>) -> DataResult<Section> {
    let (tuition, living) = ctx
        .details
        .map(|d| (d.total_tuition(), d.total_living()))
        .unwrap_or((0.0, 0.0));
    let tuition = CellValue::Number(tuition).to_string();
    let living = CellValue::Number(living).to_string();

    Ok(Section::new("Cost and Living Expenses")
        .paragraph(format!(
            "The cost of studying {} in {} ranges from {} for tuition and approximately {} \
             for living expenses per year.",
            ctx.course_name,
            ctx.country,
            bold(&tuition),
            bold(&living),
        ))
        .table(
            &["Type", "Amount (INR)"],
            vec![
                vec!["Tuition Fees".into(), bold(&tuition)],
                vec!["Living Expenses".into(), bold(&living)],
            ],
        ))
}

fn deadlines(ctx: &CourseContext<'_>) -> DataResult<Section> {
    let section = Section::new("Important Deadlines");
    let Some(deadlines) = ctx.details.map(|d| &d.deadlines).filter(|t| !t.is_empty()) else {
        return Ok(section.paragraph("No important deadlines available."));
    };

    let rows = deadlines
        .rows()
        .map(|row| {
            Ok(vec![
                row.get("Event")?.to_string(),
                row.get("Date")?.to_string(),
                row.get_opt("Notes").map(|v| v.display_or("N/A")).unwrap_or_else(|| "N/A".into()),
            ])
        })
        .collect::<DataResult<Vec<_>>>()?;

    Ok(section.table(&["Event", "Date", "Notes"], rows))
}

fn collections(ctx: &CourseContext<'_>) -> DataResult<Vec<Section>> {
    // Later sheets with the same name replace earlier ones, in first-seen order.
    let mut order: Vec<&str> = Vec::new();
    let mut by_name: BTreeMap<&str, &Collection> = BTreeMap::new();
    for c in ctx.collections {
        if by_name.insert(c.sheet_name.as_str(), c).is_none() {
            order.push(c.sheet_name.as_str());
        }
    }

    order
        .into_iter()
        .filter_map(|name| by_name.get(name).copied())
        .map(collection_section)
        .collect()
}

fn collection_section(collection: &Collection) -> DataResult<Section> {
    let rows = collection
        .table
        .rows()
        .map(|row| {
            let acceptance = row.get("Acceptance Rate")?;
            let ranking = row.get("Ranking")?;
            let ranking = if ranking.is_missing() {
                "N/A".to_string()
            } else {
                format!(
                    "Ranked {ranking} in {} by {}",
                    row.get("Stream")?,
                    row.get("Agency Name")?
                )
            };
            Ok(vec![
                row.get(UNIVERSITY_NAME)?.display_or("N/A"),
                row.get("Tuition Fees")?.display_or("N/A"),
                if acceptance.is_missing() {
                    "N/A".to_string()
                } else {
                    format!("{acceptance}%")
                },
                link("Apply Here", &row.get("Application Link")?.to_string()),
                ranking,
            ])
        })
        .collect::<DataResult<Vec<_>>>()?;

    let mut section = Section::new(collection.sheet_name.clone());
    if !collection.description.trim().is_empty() {
        section = section.paragraph(collection.description.clone());
    }
    Ok(section.table(
        &[
            UNIVERSITY_NAME,
            "Tuition Fees (INR)",
            "Acceptance Rate (%)",
            "Application Link",
            "Ranking",
        ],
        rows,
    ))
}

fn job_prospects(ctx: &CourseContext<'_>) -> DataResult<Section> {
    let employers = ctx.field("Top Employers")?;
    let salary = ctx.field("Median Salary (USD)")?;
    Ok(Section::new("Job Prospects and Career Growth").paragraph(format!(
        "Graduates from {} in {} often secure high-paying roles with companies like {employers}. \
         Starting salaries average around {salary}.",
        ctx.course_name, ctx.country,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Sheet;

    fn course_details() -> Table {
        Table::new(
            [
                COURSE_NAME,
                COUNTRY,
                UNIVERSITY_NAME,
                "Tuition Fees (INR)",
                "Living Expenses (INR)",
                "Top Specializations",
                "Relevant YouTube Video URL",
                "Top Employers",
                "Median Salary (USD)",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            vec![vec![
                "MS in Data Science".into(),
                "UK".into(),
                "Imperial College".into(),
                3000000.0.into(),
                1200000.0.into(),
                "Machine Learning".into(),
                "https://youtu.be/abc".into(),
                "Google, Amazon".into(),
                85000.0.into(),
            ]],
        )
        .unwrap()
    }

    fn table(cols: &[&str], rows: Vec<Vec<CellValue>>) -> Table {
        Table::new(cols.iter().map(|s| s.to_string()).collect(), rows).unwrap()
    }

    fn details() -> UniversityDetails {
        let wb = Workbook {
            sheets: vec![
                Sheet {
                    name: "Tuition Fees".into(),
                    table: table(&["Tuition Fees (INR)"], vec![vec![1000.0.into()], vec!["tbd".into()]]),
                },
                Sheet {
                    name: "Living Expenses".into(),
                    table: table(&["Monthly Cost (INR)"], vec![vec![50.0.into()], vec![25.0.into()]]),
                },
                Sheet {
                    name: "Important Deadlines".into(),
                    table: table(&["Event", "Date"], vec![vec!["Applications close".into(), "2025-01-15".into()]]),
                },
            ],
        };
        UniversityDetails::from_workbook(&wb).unwrap()
    }

    fn collection() -> Collection {
        let rows: Vec<CellValue> = vec![
            "MS in Data Science".into(),
            "UK".into(),
            "Top Picks".into(),
            "Imperial College".into(),
            3000000.0.into(),
            14.0.into(),
            "https://imperial.ac.uk/apply".into(),
            3.0.into(),
            "QS".into(),
            "Engineering".into(),
        ];
        let unranked = {
            let mut r = rows.clone();
            r[7] = CellValue::Missing;
            r
        };
        Collection {
            sheet_name: "Top Picks".into(),
            description: String::new(),
            table: table(COLLECTION_COLUMNS, vec![rows, unranked]),
        }
    }

    #[test]
    fn full_template_renders_every_section() {
        let courses = course_details();
        let details = details();
        let collections = vec![collection()];
        let ctx = CourseContext::select(
            &courses,
            &"MS in Data Science".into(),
            &"UK".into(),
            Some(&details),
            &collections,
        )
        .unwrap();

        let report = TemplateKind::Full.builder().render(&ctx).unwrap();
        let md = report.to_markdown();

        assert!(md.starts_with("# MS in Data Science in UK\n"));
        assert!(md.contains("Top specializations include Machine Learning"));
        assert!(md.contains("[Watch Video](https://youtu.be/abc)"));
        assert!(md.contains("ranges from **1000** for tuition and approximately **75**"));
        assert!(md.contains("| Applications close | 2025-01-15 | N/A |"));
        assert!(md.contains("## Top Picks"));
        assert!(md.contains("| 14% | [Apply Here](https://imperial.ac.uk/apply) | Ranked 3 in Engineering by QS |"));
        assert!(md.contains("| 14% | [Apply Here](https://imperial.ac.uk/apply) | N/A |"));
        assert!(md.contains("companies like Google, Amazon. Starting salaries average around 85000."));
    }

    #[test]
    fn overview_template_has_no_cost_section() {
        let courses = course_details();
        let ctx = CourseContext::select(&courses, &"MS in Data Science".into(), &"UK".into(), None, &[])
            .unwrap();
        let report = TemplateKind::Overview.builder().render(&ctx).unwrap();
        let headings: Vec<&str> = report.sections.iter().map(|s| s.heading.as_str()).collect();
        assert_eq!(headings, vec!["Overview", "Job Prospects and Career Growth"]);
    }

    #[test]
    fn deadlines_fall_back_without_details() {
        let courses = course_details();
        let ctx = CourseContext::select(&courses, &"MS in Data Science".into(), &"UK".into(), None, &[])
            .unwrap();
        let report = TemplateKind::Full.builder().render(&ctx).unwrap();
        assert!(report.to_markdown().contains("No important deadlines available."));
        assert!(report.to_markdown().contains("ranges from **0** for tuition"));
    }

    #[test]
    fn unknown_course_is_empty_result() {
        let courses = course_details();
        let err = CourseContext::select(&courses, &"MBA".into(), &"UK".into(), None, &[])
            .err()
            .unwrap();
        assert!(matches!(err, DataError::EmptyResult(_)));
    }

    #[test]
    fn absent_template_field_is_missing_column() {
        let courses = drop_top_employers(course_details());
        let ctx = CourseContext::select(&courses, &"MS in Data Science".into(), &"UK".into(), None, &[])
            .unwrap();
        let err = TemplateKind::Overview.builder().render(&ctx).unwrap_err();
        assert_eq!(err, DataError::MissingColumn("Top Employers".into()));
    }

    fn drop_top_employers(t: Table) -> Table {
        crate::data::clean::drop_columns(&t, &["Top Employers"])
    }

    #[test]
    fn details_need_a_living_cost_column() {
        let wb = Workbook {
            sheets: DETAIL_SHEETS
                .iter()
                .map(|name| Sheet {
                    name: name.to_string(),
                    table: table(&["Tuition Fees (INR)"], vec![]),
                })
                .collect(),
        };
        let err = UniversityDetails::from_workbook(&wb).unwrap_err();
        assert!(matches!(err, DataError::MissingColumns(_)));
    }

    #[test]
    fn details_accept_an_annual_cost_column() {
        let wb = Workbook {
            sheets: vec![
                Sheet {
                    name: "Tuition Fees".into(),
                    table: table(&["Tuition Fees (INR)"], vec![vec![1000.0.into()]]),
                },
                Sheet {
                    name: "Living Expenses".into(),
                    table: table(
                        &["Annual Cost (INR)"],
                        vec![vec![600000.0.into()], vec!["varies".into()], vec!["120000".into()]],
                    ),
                },
                Sheet {
                    name: "Important Deadlines".into(),
                    table: table(&["Event", "Date"], vec![]),
                },
            ],
        };
        let details = UniversityDetails::from_workbook(&wb).unwrap();
        assert_eq!(details.total_living(), 720000.0);
        assert_eq!(details.total_tuition(), 1000.0);
    }

    #[test]
    fn same_name_collections_keep_the_last_sheet_in_first_seen_order() {
        let courses = course_details();
        let mut replaced = collection();
        replaced.table.rows[0][3] = "University College London".into();
        let mut budget = collection();
        budget.sheet_name = "Budget".into();
        let collections = vec![collection(), budget, replaced];

        let ctx = CourseContext::select(&courses, &"MS in Data Science".into(), &"UK".into(), None, &collections)
            .unwrap();
        let sections = super::collections(&ctx).unwrap();
        let headings: Vec<&str> = sections.iter().map(|s| s.heading.as_str()).collect();
        assert_eq!(headings, vec!["Top Picks", "Budget"]);

        let md = TemplateKind::Full.builder().render(&ctx).unwrap().to_markdown();
        let top = &md[md.find("## Top Picks").unwrap()..md.find("## Budget").unwrap()];
        assert!(top.contains("University College London"));
    }

    #[test]
    fn substituted_values_stay_on_one_line() {
        let mut courses = course_details();
        let employers = courses.column_index("Top Employers").unwrap();
        courses.rows[0][employers] = "Google\n\n# Injected".into();
        let ctx = CourseContext::select(&courses, &"MS in Data Science".into(), &"UK".into(), None, &[])
            .unwrap();
        let md = TemplateKind::Overview.builder().render(&ctx).unwrap().to_markdown();
        assert!(md.contains("companies like Google # Injected. Starting salaries"));
        assert!(!md.lines().any(|l| l.starts_with("# Injected")));
    }

    #[test]
    fn details_need_all_sheets() {
        let wb = Workbook::single("Tuition Fees", table(&["Tuition Fees (INR)"], vec![]));
        let err = UniversityDetails::from_workbook(&wb).unwrap_err();
        assert_eq!(
            err,
            DataError::MissingSheets(vec!["Living Expenses".into(), "Important Deadlines".into()])
        );
    }

    #[test]
    fn incomplete_collection_sheets_are_skipped() {
        let wb = Workbook {
            sheets: vec![
                Sheet {
                    name: "Top Picks".into(),
                    table: collection().table,
                },
                Sheet {
                    name: "Broken".into(),
                    table: table(&[UNIVERSITY_NAME], vec![]),
                },
            ],
        };
        let (ok, skipped) = collections_from_workbook(&wb);
        assert_eq!(ok.len(), 1);
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].sheet_name, "Broken");
        assert!(skipped[0].missing.contains(&"Stream".to_string()));
    }

    #[test]
    fn course_details_validation_names_missing_columns() {
        let t = table(&[COURSE_NAME, COUNTRY], vec![]);
        let err = validate_course_details(&t).unwrap_err();
        assert_eq!(
            err,
            DataError::MissingColumns(vec![
                UNIVERSITY_NAME.into(),
                "Tuition Fees (INR)".into(),
                "Living Expenses (INR)".into(),
            ])
        );
    }
}
