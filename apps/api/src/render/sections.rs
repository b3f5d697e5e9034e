//! Section Renderer — turns each repeatable resume section into a LaTeX block.
//!
//! Macros (`\resumeSubheading`, `\resumeProjectHeading`, `\resumeItem`, ...) are
//! defined in the template preamble. All user text is escaped here, one field at
//! a time; nothing downstream escapes again.
//!
//! Spacing rule for itemized sections: every entry except the last is followed by
//! `\vspace{-8pt}`, the last one by `\vspace{0pt}`. The choice depends only on
//! position.

use crate::models::resume::{EducationEntry, ExperienceEntry, LeadershipEntry, ProjectEntry};
use crate::render::escape::escape_latex;

pub const TIGHT_SPACING: &str = r"\vspace{-8pt}";
pub const NEUTRAL_SPACING: &str = r"\vspace{0pt}";

const EDUCATION_PLACEHOLDER: &str = "    \\resumeSubheading{No Education Listed}{}{}{}\n";

const EXPERIENCE_PLACEHOLDER: &str = r"      \resumeProjectHeading
        {\textbf{No Experience Listed}}{}
        \vspace{-8pt}
        \resumeItemListStart
            \resumeItem{No work experience to display}
        \resumeItemListEnd
        \vspace{0pt}
";

const PROJECTS_PLACEHOLDER: &str = r"        \resumeProjectHeading
          {\textbf{No Projects Listed}}{}
          \vspace{-8pt}
          \resumeItemListStart
              \resumeItem{No projects to display}
          \resumeItemListEnd
          \vspace{0pt}
";

const LEADERSHIP_PLACEHOLDER: &str = r"        \resumeProjectHeading
          {\textbf{No Leadership Listed}}{}
          \vspace{-8pt}
          \resumeItemListStart
              \resumeItem{No leadership experience to display}
          \resumeItemListEnd
          \vspace{0pt}
";

const ACHIEVEMENTS_PLACEHOLDER: &str = "        \\resumeItem{No achievements to display}\n";

// ────────────────────────────────────────────────────────────────────────────
// Shared helpers
// ────────────────────────────────────────────────────────────────────────────

fn spacing_directive(is_last: bool) -> &'static str {
    if is_last {
        NEUTRAL_SPACING
    } else {
        TIGHT_SPACING
    }
}

/// Emits the bullet list for one entry. Entries with no non-blank points get no
/// list at all: an empty `itemize` is a LaTeX error.
fn push_points(out: &mut String, indent: &str, points: &[String]) {
    let points: Vec<&String> = points.iter().filter(|p| !p.trim().is_empty()).collect();
    if points.is_empty() {
        return;
    }
    out.push_str(&format!("{indent}\\vspace{{-8pt}}\n"));
    out.push_str(&format!("{indent}\\resumeItemListStart\n"));
    for point in points {
        out.push_str(&format!(
            "            \\resumeItem{{{}}}\n",
            escape_latex(point)
        ));
    }
    out.push_str(&format!("{indent}\\resumeItemListEnd\n"));
}

/// Renders the non-blank entries with `render_one`, or `placeholder` when none remain.
fn render_entries<T>(
    entries: &[T],
    is_blank: impl Fn(&T) -> bool,
    placeholder: &str,
    render_one: impl Fn(&mut String, &T, bool),
) -> String {
    let visible: Vec<&T> = entries.iter().filter(|e| !is_blank(*e)).collect();
    if visible.is_empty() {
        return placeholder.to_string();
    }

    let mut out = String::new();
    let last = visible.len() - 1;
    for (i, entry) in visible.into_iter().enumerate() {
        render_one(&mut out, entry, i == last);
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

pub fn render_education(entries: &[EducationEntry]) -> String {
    render_entries(entries, EducationEntry::is_blank, EDUCATION_PLACEHOLDER, |out, edu, _| {
        out.push_str(&format!(
            "    \\resumeSubheading\n      {{{}}}{{{}}}\n      {{{}}}{{{}}}\n",
            escape_latex(&edu.university),
            escape_latex(&edu.date),
            escape_latex(&edu.degree),
            escape_latex(&edu.cgpa),
        ));
    })
}

pub fn render_experience(entries: &[ExperienceEntry]) -> String {
    render_entries(
        entries,
        ExperienceEntry::is_blank,
        EXPERIENCE_PLACEHOLDER,
        |out, exp, is_last| {
            let location = if exp.location.trim().is_empty() {
                String::new()
            } else {
                format!(" $|$ \\emph{{{}}}", escape_latex(&exp.location))
            };
            out.push_str("      \\resumeProjectHeading\n");
            out.push_str(&format!(
                "        {{\\textbf{{{}}} $|$ \\emph{{{}}}{location}}}{{{}}}\n",
                escape_latex(&exp.company),
                escape_latex(&exp.role),
                escape_latex(&exp.date),
            ));
            push_points(out, "        ", &exp.points);
            out.push_str(&format!("        {}\n", spacing_directive(is_last)));
        },
    )
}

pub fn render_projects(entries: &[ProjectEntry]) -> String {
    render_entries(
        entries,
        ProjectEntry::is_blank,
        PROJECTS_PLACEHOLDER,
        |out, proj, is_last| {
            let link = if proj.link.trim().is_empty() {
                String::new()
            } else {
                format!("\\href{{{}}}{{\\it Github}}", escape_latex(&proj.link))
            };
            out.push_str("        \\resumeProjectHeading\n");
            out.push_str(&format!(
                "          {{\\textbf{{{}}}}}{{{link}}}\n",
                escape_latex(&proj.name),
            ));
            push_points(out, "          ", &proj.points);
            out.push_str(&format!("          {}\n", spacing_directive(is_last)));
        },
    )
}

pub fn render_leadership(entries: &[LeadershipEntry]) -> String {
    render_entries(
        entries,
        LeadershipEntry::is_blank,
        LEADERSHIP_PLACEHOLDER,
        |out, lead, is_last| {
            out.push_str("        \\resumeProjectHeading\n");
            out.push_str(&format!(
                "          {{\\textbf{{{}}} $|$ \\emph{{{}}}}}{{{}}}\n",
                escape_latex(&lead.organization),
                escape_latex(&lead.role),
                escape_latex(&lead.date),
            ));
            push_points(out, "          ", &lead.points);
            out.push_str(&format!("          {}\n", spacing_directive(is_last)));
        },
    )
}

pub fn render_achievements(achievements: &[String]) -> String {
    render_entries(
        achievements,
        |a: &String| a.trim().is_empty(),
        ACHIEVEMENTS_PLACEHOLDER,
        |out, ach, _| {
            out.push_str(&format!("        \\resumeItem{{{}}}\n", escape_latex(ach)));
        },
    )
}
