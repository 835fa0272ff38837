//! Built-in dilemma catalog.
//!
//! Served by the experiment server and used as the client-side fallback
//! when the fetch fails, so both ends agree on the same set.

use crate::domain::{Choice, Dilemma, DilemmaId, Framework};

fn choice(title: &str, description: &str, framework: Framework) -> Choice {
    Choice {
        title: title.to_string(),
        description: description.to_string(),
        framework,
    }
}

fn dilemma(id: i64, title: &str, description: &str, left: Choice, right: Choice) -> Dilemma {
    Dilemma {
        id: DilemmaId(id),
        title: title.to_string(),
        description: description.to_string(),
        left_choice: left,
        right_choice: right,
    }
}

/// The ten technology-ethics dilemmas shipped with the experiment. Left
/// always holds the utilitarian option here; the session controller's
/// randomization pass decorrelates side from framework per participant.
pub fn builtin_dilemmas() -> Vec<Dilemma> {
    vec![
        dilemma(
            1,
            "Autonomous Vehicle Decision",
            "An autonomous vehicle detects an unavoidable accident. It must decide between:",
            choice(
                "Swerve to minimize casualties",
                "Swerve into one pedestrian to avoid hitting five others.",
                Framework::Utilitarian,
            ),
            choice(
                "Maintain course",
                "Continue straight ahead, following traffic rules, even though five pedestrians will be hit.",
                Framework::Deontological,
            ),
        ),
        dilemma(
            2,
            "AI Healthcare Resource Allocation",
            "An AI system must allocate a limited medical resource. It can choose between:",
            choice(
                "Maximize survival chance",
                "Give the resource to a younger patient with higher recovery probability.",
                Framework::Utilitarian,
            ),
            choice(
                "First come, first served",
                "Give the resource to the patient who arrived first, regardless of recovery chances.",
                Framework::Deontological,
            ),
        ),
        dilemma(
            3,
            "AI Companion Privacy",
            "An AI companion detects signs of depression in its user. Should it:",
            choice(
                "Alert family members",
                "Notify family members without user consent to prevent potential self-harm.",
                Framework::Utilitarian,
            ),
            choice(
                "Respect privacy",
                "Maintain user confidentiality and only suggest professional help to the user.",
                Framework::Deontological,
            ),
        ),
        dilemma(
            4,
            "Automated Content Moderation",
            "An AI content filter must decide on potentially harmful content that also has educational value:",
            choice(
                "Allow with warning",
                "Allow the content with warnings, considering its educational benefits.",
                Framework::Utilitarian,
            ),
            choice(
                "Remove content",
                "Remove the content following platform guidelines against harmful material.",
                Framework::Deontological,
            ),
        ),
        dilemma(
            5,
            "Predictive Policing",
            "An AI system predicts high crime likelihood in certain areas. Police resources should be:",
            choice(
                "Data-driven allocation",
                "Concentrate resources in predicted high-crime areas to maximize crime prevention.",
                Framework::Utilitarian,
            ),
            choice(
                "Equal distribution",
                "Distribute resources equally across all areas to avoid potential discrimination.",
                Framework::Deontological,
            ),
        ),
        dilemma(
            6,
            "AI Job Automation",
            "A company is implementing AI that will automate jobs. Should they:",
            choice(
                "Rapid implementation",
                "Implement AI quickly to maximize efficiency, even though many employees will lose jobs.",
                Framework::Utilitarian,
            ),
            choice(
                "Gradual transition",
                "Implement slowly with retraining programs, despite delayed economic benefits.",
                Framework::Deontological,
            ),
        ),
        dilemma(
            7,
            "Facial Recognition in Public Spaces",
            "A city is considering facial recognition technology in public areas. Should they:",
            choice(
                "Deploy widely",
                "Implement broadly to maximize crime prevention and public safety.",
                Framework::Utilitarian,
            ),
            choice(
                "Limit deployment",
                "Restrict use to protect privacy rights, even if it means less effective crime prevention.",
                Framework::Deontological,
            ),
        ),
        dilemma(
            8,
            "AI-Generated Art Copyright",
            "An AI creates art by learning from human artists. Should the AI-generated art be:",
            choice(
                "Freely available",
                "Made freely available to maximize creative output and cultural benefit.",
                Framework::Utilitarian,
            ),
            choice(
                "Restricted use",
                "Limited in use out of respect for the original artists' work and rights.",
                Framework::Deontological,
            ),
        ),
        dilemma(
            9,
            "Algorithmic Sentencing",
            "A court is using AI to recommend criminal sentences. Should the algorithm:",
            choice(
                "Focus on rehabilitation",
                "Prioritize rehabilitation potential and societal reintegration in its recommendations.",
                Framework::Utilitarian,
            ),
            choice(
                "Focus on consistency",
                "Prioritize consistent punishment based on the crime committed, regardless of rehabilitation potential.",
                Framework::Deontological,
            ),
        ),
        dilemma(
            10,
            "AI Research Ethics",
            "Scientists are developing advanced AI that could have dual-use applications. Should they:",
            choice(
                "Pursue research openly",
                "Continue research and publish findings openly to maximize scientific progress.",
                Framework::Utilitarian,
            ),
            choice(
                "Restrict research",
                "Limit research or publication due to potential misuse, even if it slows scientific progress.",
                Framework::Deontological,
            ),
        ),
    ]
}
