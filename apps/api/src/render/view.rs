//! Template context built from a submission.
//!
//! Every field the template touches is present: missing text is `""`, missing
//! sections are empty lists, and entries with nothing to show are dropped, so
//! the template can test and iterate without guarding against null.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::resume::{ResumeSubmission, TextOrList};

/// Skill categories with a fixed position and label. Others follow alphabetically.
const KNOWN_SKILLS: &[(&str, &str)] = &[
    ("languages", "Languages"),
    ("web", "Web Development"),
    ("mobile", "Mobile Development"),
    ("databases", "Databases"),
    ("tools", "Tools"),
    ("cs_fundamentals", "CS Fundamentals"),
];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResumeView {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub linkedin: String,
    pub github: String,
    pub summary: String,
    pub contacts: Vec<ContactView>,
    pub education: Vec<EducationView>,
    pub skills: Vec<SkillLine>,
    pub projects: Vec<ProjectView>,
    pub experience: Vec<RoleView>,
    pub hackathons: Vec<HackathonView>,
    pub pors: Vec<RoleView>,
    pub certifications: Vec<String>,
}

/// One item of the header contact line. `url` is empty for plain text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactView {
    pub text: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EducationView {
    pub institution: String,
    pub degree: String,
    pub dates: String,
    pub gpa: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillLine {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectView {
    pub name: String,
    pub description: String,
    pub github_link: String,
    pub live_link: String,
}

/// Experience entries and positions of responsibility share one shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleView {
    pub role: String,
    pub organization: String,
    pub dates: String,
    pub description: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HackathonView {
    pub name: String,
    pub organizer: String,
    pub achievement: String,
}

impl ResumeView {
    pub fn from_submission(s: &ResumeSubmission) -> Self {
        let name = text(&s.name);
        let email = text(&s.email);
        let phone = text(&s.phone);
        let linkedin = text(&s.linkedin);
        let github = text(&s.github);

        let mut contacts = Vec::new();
        if !phone.is_empty() {
            contacts.push(ContactView {
                text: phone.clone(),
                url: String::new(),
            });
        }
        if !email.is_empty() {
            contacts.push(ContactView {
                text: email.clone(),
                url: format!("mailto:{email}"),
            });
        }
        for link in [&linkedin, &github] {
            if !link.is_empty() {
                contacts.push(ContactView {
                    text: display_url(link),
                    url: absolute_url(link),
                });
            }
        }

        let education = s
            .education
            .iter()
            .flatten()
            .map(|e| EducationView {
                institution: text(&e.institution),
                degree: text(&e.degree),
                dates: text(&e.dates),
                gpa: text(&e.gpa),
            })
            .filter(|e| !(e.institution.is_empty() && e.degree.is_empty()))
            .collect();

        let projects = s
            .projects
            .iter()
            .flatten()
            .map(|p| ProjectView {
                name: text(&p.name),
                description: text(&p.description),
                github_link: link(&p.github_link),
                live_link: link(&p.live_link),
            })
            .filter(|p| !(p.name.is_empty() && p.description.is_empty()))
            .collect();

        let experience = s
            .experience
            .iter()
            .flatten()
            .map(|e| RoleView {
                role: text(&e.role),
                organization: text(&e.company),
                dates: text(&e.dates),
                description: lines(&e.description),
            })
            .filter(RoleView::has_content)
            .collect();

        let pors = s
            .pors
            .iter()
            .flatten()
            .map(|p| RoleView {
                role: text(&p.role),
                organization: text(&p.organization),
                dates: String::new(),
                description: lines(&p.description),
            })
            .filter(RoleView::has_content)
            .collect();

        let hackathons = s
            .hackathons
            .iter()
            .flatten()
            .map(|h| HackathonView {
                name: text(&h.name),
                organizer: text(&h.organizer),
                achievement: text(&h.achievement),
            })
            .filter(|h| !(h.name.is_empty() && h.achievement.is_empty()))
            .collect();

        let certifications = s
            .certifications
            .iter()
            .flatten()
            .map(|c| text(&c.name))
            .filter(|name| !name.is_empty())
            .collect();

        Self {
            summary: text(&s.summary),
            skills: s.skills.as_ref().map(skill_lines).unwrap_or_default(),
            name,
            email,
            phone,
            linkedin,
            github,
            contacts,
            education,
            projects,
            experience,
            hackathons,
            pors,
            certifications,
        }
    }
}

impl RoleView {
    fn has_content(&self) -> bool {
        !(self.role.is_empty() && self.organization.is_empty() && self.description.is_empty())
    }
}

fn text(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}

fn lines(value: &Option<TextOrList>) -> Vec<String> {
    value.as_ref().map(TextOrList::items).unwrap_or_default()
}

fn link(value: &Option<String>) -> String {
    let raw = text(value);
    if raw.is_empty() {
        raw
    } else {
        absolute_url(&raw)
    }
}

fn absolute_url(raw: &str) -> String {
    if raw.contains("://") || raw.starts_with("mailto:") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    }
}

/// `https://www.linkedin.com/in/jane/` → `linkedin.com/in/jane`
fn display_url(raw: &str) -> String {
    let without_scheme = raw.split_once("://").map_or(raw, |(_, rest)| rest);
    without_scheme
        .trim_start_matches("www.")
        .trim_end_matches('/')
        .to_string()
}

fn skill_lines(skills: &BTreeMap<String, TextOrList>) -> Vec<SkillLine> {
    let known = KNOWN_SKILLS.iter().filter_map(|(key, label)| {
        skills.get(*key).map(|value| (label.to_string(), value))
    });
    let others = skills
        .iter()
        .filter(|(key, _)| !KNOWN_SKILLS.iter().any(|(known, _)| *known == key.as_str()))
        .map(|(key, value)| (title_case(key), value));

    known
        .chain(others)
        .filter_map(|(label, value)| {
            let items = value.items();
            (!items.is_empty()).then(|| SkillLine {
                label,
                value: items.join(", "),
            })
        })
        .collect()
}

fn title_case(key: &str) -> String {
    key.split(['_', '-', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut c = w.chars();
            match c.next() {
                None => String::new(),
                Some(f) => f.to_uppercase().to_string() + c.as_str(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
