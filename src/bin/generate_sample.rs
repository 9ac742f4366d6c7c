//! Write a set of sample inputs for the dashboard:
//!
//! * `catalog.parquet` – course catalog for the explorer
//! * `course_details.xlsx` – one row per course, country and university
//! * `collections.xlsx` – themed university lists, plus one malformed sheet
//! * `university_details.xlsx` – tuition, living costs and deadlines
//!
//! Usage: `generate_sample [output_dir]` (default `sample_data`).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rusty_report::data::{CellValue, Table};
use rusty_report::export::xlsx::tables_to_xlsx;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform value in `[lo, hi)`, rounded to a multiple of `step`.
    fn range(&mut self, lo: f64, hi: f64, step: f64) -> f64 {
        let v = lo + (hi - lo) * self.next_f64();
        (v / step).round() * step
    }
}

const COLLEGES: &[&str] = &["Northfield University", "Lakeside Institute", "Riverside College"];
const COURSES: &[&str] = &["MS Computer Science", "MS Data Science", "MBA", "MEng Electrical"];

// (course, country, university, top specializations, employers, salary)
const COURSE_ROWS: &[(&str, &str, &str, &str, &str, f64)] = &[
    ("MS Computer Science", "Canada", "University of Toronto", "AI, Systems", "Shopify, Google", 92000.0),
    ("MS Computer Science", "Canada", "University of Waterloo", "Software Engineering", "Microsoft, RBC", 88000.0),
    ("MS Computer Science", "UK", "Imperial College London", "Security, Robotics", "DeepMind, Arm", 85000.0),
    ("MS Data Science", "UK", "University of Edinburgh", "Machine Learning", "Amazon, Skyscanner", 80000.0),
    ("MS Data Science", "Germany", "TU Munich", "Statistics, NLP", "Siemens, BMW", 78000.0),
];

fn main() -> Result<()> {
    env_logger::init();

    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_data"));
    std::fs::create_dir_all(&out_dir).with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);

    write_catalog(&out_dir.join("catalog.parquet"), &mut rng)?;

    let details = course_details(&mut rng)?;
    write_xlsx(&out_dir.join("course_details.xlsx"), &[("Course Details", &details)])?;

    let top = collection("Top Universities", &COURSE_ROWS[0..3], &mut rng)?;
    let affordable = collection("Affordable Picks", &COURSE_ROWS[2..5], &mut rng)?;
    let notes = table(&["Notes"], vec![vec!["Rankings refreshed every autumn".into()]])?;
    write_xlsx(
        &out_dir.join("collections.xlsx"),
        &[("Top Universities", &top), ("Affordable Picks", &affordable), ("Notes", &notes)],
    )?;

    let (tuition, living, deadlines) = university_details(&mut rng)?;
    write_xlsx(
        &out_dir.join("university_details.xlsx"),
        &[
            ("Tuition Fees", &tuition),
            ("Living Expenses", &living),
            ("Important Deadlines", &deadlines),
        ],
    )?;

    println!("Wrote sample inputs to {}", out_dir.display());
    Ok(())
}

fn write_xlsx(path: &Path, sheets: &[(&str, &Table)]) -> Result<()> {
    let bytes = tables_to_xlsx(sheets)?;
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

fn table(columns: &[&str], rows: Vec<Vec<CellValue>>) -> Result<Table> {
    Ok(Table::new(columns.iter().map(|c| c.to_string()).collect(), rows)?)
}

fn course_details(rng: &mut SimpleRng) -> Result<Table> {
    let rows = COURSE_ROWS
        .iter()
        .map(|&(course, country, university, specs, employers, salary)| {
            vec![
                course.into(),
                country.into(),
                university.into(),
                rng.range(1_500_000.0, 4_000_000.0, 10_000.0).into(),
                rng.range(600_000.0, 1_500_000.0, 10_000.0).into(),
                rng.range(10.0, 70.0, 1.0).into(),
                specs.into(),
                format!("https://www.youtube.com/results?search_query={}", university.replace(' ', "+")).into(),
                employers.into(),
                salary.into(),
            ]
        })
        .collect();
    table(
        &[
            "Course Name",
            "Country",
            "University Name",
            "Tuition Fees (INR)",
            "Living Expenses (INR)",
            "Acceptance Rate (%)",
            "Top Specializations",
            "Relevant YouTube Video URL",
            "Top Employers",
            "Median Salary (USD)",
        ],
        rows,
    )
}

fn collection(name: &str, courses: &[(&str, &str, &str, &str, &str, f64)], rng: &mut SimpleRng) -> Result<Table> {
    let rows = courses
        .iter()
        .enumerate()
        .map(|(i, &(course, country, university, _, _, _))| {
            // Every third entry is unranked.
            let ranking = if i % 3 == 2 {
                CellValue::Missing
            } else {
                rng.range(1.0, 150.0, 1.0).into()
            };
            vec![
                course.into(),
                country.into(),
                name.into(),
                university.into(),
                rng.range(1_500_000.0, 4_000_000.0, 10_000.0).into(),
                rng.range(10.0, 70.0, 1.0).into(),
                format!("https://apply.example.edu/{}", university.to_lowercase().replace(' ', "-")).into(),
                ranking,
                "QS".into(),
                "Computer Science".into(),
            ]
        })
        .collect();
    table(
        &[
            "Course Name",
            "Country",
            "Collection Name",
            "University Name",
            "Tuition Fees",
            "Acceptance Rate",
            "Application Link",
            "Ranking",
            "Agency Name",
            "Stream",
        ],
        rows,
    )
}

fn university_details(rng: &mut SimpleRng) -> Result<(Table, Table, Table)> {
    let tuition = table(
        &["Component", "Tuition Fees (INR)"],
        ["Semester 1", "Semester 2", "Semester 3", "Semester 4"]
            .iter()
            .map(|s| vec![(*s).into(), rng.range(400_000.0, 900_000.0, 5_000.0).into()])
            .collect(),
    )?;
    let living = table(
        &["Expense", "Monthly Cost (INR)"],
        ["Rent", "Food", "Transport", "Insurance"]
            .iter()
            .map(|s| vec![(*s).into(), rng.range(5_000.0, 60_000.0, 500.0).into()])
            .collect(),
    )?;
    let deadlines = table(
        &["Event", "Date", "Notes"],
        vec![
            vec!["Applications open".into(), "2025-09-01".into(), CellValue::Missing],
            vec!["Priority deadline".into(), "2025-12-15".into(), "Scholarship consideration".into()],
            vec!["Final deadline".into(), "2026-02-01".into(), "International applicants".into()],
        ],
    )?;
    Ok((tuition, living, deadlines))
}

fn write_catalog(path: &Path, rng: &mut SimpleRng) -> Result<()> {
    let mut ids = Vec::new();
    let mut colleges = Vec::new();
    let mut courses = Vec::new();
    let mut links = Vec::new();
    let mut fees = Vec::new();
    let mut durations = Vec::new();
    let mut toefl = Vec::new();
    let mut ielts = Vec::new();
    let mut scholarship = Vec::new();

    let mut id: i64 = 1;
    for &college in COLLEGES {
        for &course in COURSES {
            ids.push(id);
            colleges.push(college);
            courses.push(course);
            links.push(format!("https://courses.example.edu/{id}"));
            fees.push(rng.range(15_000.0, 55_000.0, 500.0));
            durations.push(if course == "MBA" { 24.0 } else { rng.range(12.0, 24.0, 6.0) });
            // MBA programmes take the GMAT instead.
            toefl.push((course != "MBA").then(|| rng.range(80.0, 110.0, 1.0)));
            ielts.push((course != "MBA").then(|| rng.range(6.0, 7.5, 0.5)));
            scholarship.push(0.0);
            id += 1;
        }
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("ID", DataType::Int64, false),
        Field::new("college", DataType::Utf8, false),
        Field::new("Course_name", DataType::Utf8, false),
        Field::new("Course_link", DataType::Utf8, false),
        Field::new("Fees", DataType::Float64, false),
        Field::new("Duration", DataType::Float64, false),
        Field::new("TOEFL", DataType::Float64, true),
        Field::new("IELTS", DataType::Float64, true),
        Field::new("Scholarship", DataType::Float64, false),
    ]));

    let rows = ids.len();
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(ids)),
            Arc::new(StringArray::from(colleges)),
            Arc::new(StringArray::from(courses)),
            Arc::new(StringArray::from(links)),
            Arc::new(Float64Array::from(fees)),
            Arc::new(Float64Array::from(durations)),
            Arc::new(Float64Array::from(toefl)),
            Arc::new(Float64Array::from(ielts)),
            Arc::new(Float64Array::from(scholarship)),
        ],
    )
    .context("Failed to create RecordBatch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("Failed to create writer")?;
    writer.write(&batch).context("Failed to write batch")?;
    writer.close().context("Failed to close writer")?;

    log::info!("Wrote {rows} catalog rows to {}", path.display());
    Ok(())
}
