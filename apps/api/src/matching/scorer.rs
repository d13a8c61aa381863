//! Compares a candidate's skills with a job's skills.
//!
//! Pure and deterministic. An empty job skill set scores 0 rather than failing,
//! which is also what a posting without a description produces.

use serde::{Deserialize, Serialize};

use crate::models::SkillSet;

/// Comparison of one candidate against one job. Built fresh per pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub candidate_skills: SkillSet,
    pub job_skills: SkillSet,
    pub matching_skills: SkillSet,
    pub missing_skills: SkillSet,
    /// 0 – 100
    pub match_percentage: f64,
    /// One suggestion per missing skill, in `missing_skills` order.
    pub recommendations: Vec<String>,
}

impl MatchReport {
    /// True when the match reaches `threshold`, given as a fraction in [0, 1].
    pub fn meets_threshold(&self, threshold: f64) -> bool {
        !self.job_skills.is_empty() && self.match_percentage >= threshold * 100.0
    }
}

pub fn score(candidate_skills: &SkillSet, job_skills: &SkillSet) -> MatchReport {
    let matching_skills = candidate_skills.intersection(job_skills);
    let missing_skills = job_skills.difference(candidate_skills);

    let match_percentage = if job_skills.is_empty() {
        0.0
    } else {
        100.0 * matching_skills.len() as f64 / job_skills.len() as f64
    };

    let recommendations = missing_skills.iter().map(recommendation_for).collect();

    MatchReport {
        candidate_skills: candidate_skills.clone(),
        job_skills: job_skills.clone(),
        matching_skills,
        missing_skills,
        match_percentage,
        recommendations,
    }
}

fn recommendation_for(skill: &str) -> String {
    format!("Consider learning {skill} through online courses")
}
