//! Column schema derivation from a course's graded structure.
//!
//! The grade report and the row compiler both walk [`GradedAssignmentSchema::columns`],
//! so the header count and the per-row value count cannot drift apart.

use crate::types::{BlockKey, GradingContext};
use std::collections::HashMap;

/// Headers for one assignment type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentColumns {
    pub category: String,
    /// Subsection location -> header, in course order
    pub subsection_headers: Vec<(BlockKey, String)>,
    pub average_header: String,
    /// True only when the category has more than one subsection
    pub separate_subsection_avg_headers: bool,
}

/// One column of the grades section of a grade report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeColumn<'a> {
    /// Score of a single subsection
    Subsection { category: &'a str, location: &'a BlockKey, header: &'a str },
    /// Category average from the grade breakdown
    Average { category: &'a str, header: &'a str },
}

impl<'a> GradeColumn<'a> {
    pub fn header(&self) -> &'a str {
        match self {
            GradeColumn::Subsection { header, .. } | GradeColumn::Average { header, .. } => *header,
        }
    }
}

/// Ordered assignment-type -> headers mapping for a course
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GradedAssignmentSchema {
    assignments: Vec<AssignmentColumns>,
}

impl GradedAssignmentSchema {
    /// Derive the schema from a grading context
    pub fn derive(grading: &GradingContext) -> Self {
        let assignments = grading
            .categories
            .iter()
            .map(|category| {
                let subsection_headers = category
                    .subsections
                    .iter()
                    .enumerate()
                    .map(|(idx, subsection)| {
                        let header = format!("{} {}: {}", category.name, idx + 1, subsection.display_name);
                        (subsection.location.clone(), header)
                    })
                    .collect();

                // Separate subsection and average columns only with more than one subsection
                let separate_subsection_avg_headers = category.subsections.len() > 1;
                let average_header = if separate_subsection_avg_headers {
                    format!("{} (Avg)", category.name)
                } else {
                    category.name.clone()
                };

                AssignmentColumns {
                    category: category.name.clone(),
                    subsection_headers,
                    average_header,
                    separate_subsection_avg_headers,
                }
            })
            .collect();

        Self { assignments }
    }

    pub fn assignments(&self) -> &[AssignmentColumns] {
        &self.assignments
    }

    /// Walk the grade columns in report order.
    ///
    /// A category with one subsection yields a single subsection column under the
    /// average header; a category without subsections yields only its average.
    pub fn columns(&self) -> impl Iterator<Item = GradeColumn<'_>> {
        self.assignments.iter().flat_map(|info| {
            let mut columns = Vec::with_capacity(info.subsection_headers.len() + 1);
            let category = info.category.as_str();
            if info.separate_subsection_avg_headers {
                for (location, header) in &info.subsection_headers {
                    columns.push(GradeColumn::Subsection { category, location, header: header.as_str() });
                }
                columns.push(GradeColumn::Average { category, header: info.average_header.as_str() });
            } else if let Some((location, _)) = info.subsection_headers.first() {
                columns.push(GradeColumn::Subsection { category, location, header: info.average_header.as_str() });
            } else {
                columns.push(GradeColumn::Average { category, header: info.average_header.as_str() });
            }
            columns
        })
    }

    pub fn headers(&self) -> Vec<String> {
        self.columns().map(|c| c.header().to_string()).collect()
    }

    pub fn column_count(&self) -> usize {
        self.columns().count()
    }
}

/// Earned/possible header pair for one scorable block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemColumns {
    pub location: BlockKey,
    pub earned_header: String,
    pub possible_header: String,
}

/// Ordered scorable-block -> headers mapping for the problem grade report
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProblemSchema {
    blocks: Vec<ProblemColumns>,
}

impl ProblemSchema {
    /// Derive the per-problem columns, one level below the subsection columns
    pub fn derive(grading: &GradingContext) -> Self {
        let mut blocks: Vec<ProblemColumns> = Vec::new();
        let mut positions: HashMap<BlockKey, usize> = HashMap::new();

        for category in &grading.categories {
            for (idx, subsection) in category.subsections.iter().enumerate() {
                for block in &subsection.scored_descendants {
                    let base = format!(
                        "{} {}: {} - {}",
                        category.name,
                        idx + 1,
                        subsection.display_name,
                        block.display_name
                    );
                    let columns = ProblemColumns {
                        location: block.location.clone(),
                        earned_header: format!("{} (Earned)", base),
                        possible_header: format!("{} (Possible)", base),
                    };

                    // A block reachable from two subsections keeps its first slot
                    match positions.get(&block.location) {
                        Some(&pos) => blocks[pos] = columns,
                        None => {
                            positions.insert(block.location.clone(), blocks.len());
                            blocks.push(columns);
                        }
                    }
                }
            }
        }

        Self { blocks }
    }

    pub fn blocks(&self) -> &[ProblemColumns] {
        &self.blocks
    }

    pub fn headers(&self) -> Vec<String> {
        self.blocks.iter().flat_map(|b| [b.earned_header.clone(), b.possible_header.clone()]).collect()
    }

    pub fn column_count(&self) -> usize {
        self.blocks.len() * 2
    }
}
