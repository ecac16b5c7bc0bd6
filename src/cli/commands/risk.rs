use chrono::NaiveDate;
use clap::{Args, Subcommand};
use serde_json::{json, Value};

use crate::cli::utils::*;
use crate::cli::{require_section, OutputFormat};
use crate::client::ApiClient;
use crate::models::{search, AssetType, Risk, RiskDraft, RiskField, RiskStatus, RiskType, Section};
use crate::scoring::{score, RiskInputs};

#[derive(Subcommand)]
pub enum RiskCommands {
    #[command(about = "List risks visible to the signed-in user")]
    List {
        #[arg(long, help = "Filter by risk id, description, department, type or level")]
        search: Option<String>,
    },

    #[command(about = "Show one risk")]
    Show {
        #[arg(help = "Risk record id")]
        id: String,
    },

    #[command(about = "Register a new risk")]
    Create {
        #[command(flatten)]
        fields: RiskArgs,
    },

    #[command(about = "Edit an existing risk")]
    Update {
        #[arg(help = "Risk record id")]
        id: String,
        #[command(flatten)]
        fields: RiskArgs,
    },

    #[command(about = "Delete a risk")]
    Delete {
        #[arg(help = "Risk record id")]
        id: String,
    },

    #[command(about = "Compute impact, score and level from ratings")]
    Score {
        #[arg(allow_hyphen_values = true)]
        confidentiality: String,
        #[arg(allow_hyphen_values = true)]
        integrity: String,
        #[arg(allow_hyphen_values = true)]
        availability: String,
        #[arg(allow_hyphen_values = true)]
        likelihood: String,
    },
}

/// Form fields; anything left out keeps the form's current value
#[derive(Args, Debug, Default)]
pub struct RiskArgs {
    #[arg(long)]
    pub risk_id: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub department: Option<String>,
    #[arg(long, help = "Strategic, Operational or Tactical")]
    pub risk_type: Option<RiskType>,
    #[arg(long)]
    pub asset: Option<String>,
    #[arg(long, help = "Public, Private, Protected or Confidential")]
    pub asset_type: Option<AssetType>,
    #[arg(long)]
    pub confidentiality: Option<String>,
    #[arg(long)]
    pub integrity: Option<String>,
    #[arg(long)]
    pub availability: Option<String>,
    #[arg(long)]
    pub likelihood: Option<String>,
    #[arg(long)]
    pub existing_controls: Option<String>,
    #[arg(long)]
    pub additional_controls: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long, help = "Open, WIP or Closed")]
    pub status: Option<RiskStatus>,
    #[arg(long, help = "Deadline as YYYY-MM-DD")]
    pub deadline: Option<NaiveDate>,
}

impl RiskArgs {
    pub fn apply(self, draft: &mut RiskDraft) {
        if let Some(v) = self.risk_id {
            draft.risk_id = v;
        }
        if let Some(v) = self.description {
            draft.risk_description = v;
        }
        if let Some(v) = self.department {
            draft.department = v;
        }
        if let Some(v) = self.risk_type {
            draft.risk_type = v;
        }
        if let Some(v) = self.asset {
            draft.asset = v;
        }
        if let Some(v) = self.asset_type {
            draft.asset_type = v;
        }
        if let Some(v) = self.existing_controls {
            draft.existing_controls = v;
        }
        if let Some(v) = self.additional_controls {
            draft.additional_controls = v;
        }
        if let Some(v) = self.notes {
            draft.additional_notes = v;
        }
        if let Some(v) = self.status {
            draft.status = v;
        }
        if let Some(v) = self.deadline {
            draft.deadline_date = Some(v);
        }

        let ratings = [
            (RiskField::Confidentiality, self.confidentiality),
            (RiskField::Integrity, self.integrity),
            (RiskField::Availability, self.availability),
            (RiskField::Likelihood, self.likelihood),
        ];
        for (field, raw) in ratings {
            if let Some(raw) = raw {
                draft.set(field, raw);
            }
        }
    }
}

pub async fn handle(cmd: RiskCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    if !matches!(cmd, RiskCommands::Score { .. }) {
        require_section(client, Section::Risks).await?;
    }

    match cmd {
        RiskCommands::List { search: term } => {
            let risks = search(client.visible_risks().await?, term.as_deref().unwrap_or(""));

            if risks.is_empty() {
                return output_empty_collection(&output_format, "risks", "No risks found");
            }

            match output_format {
                OutputFormat::Json => output_collection_json("risks", serde_json::to_value(&risks)?)?,
                OutputFormat::Text => print_risk_table(&risks),
            }
            Ok(())
        }

        RiskCommands::Show { id } => {
            let risk = client.get_risk(&id).await?;
            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&json!({ "risk": risk }))?),
                OutputFormat::Text => print_risk(&risk),
            }
            Ok(())
        }

        RiskCommands::Create { fields } => {
            let mut draft = RiskDraft::new();
            fields.apply(&mut draft);

            let created = client.create_risk(&mut draft).await?;
            let assessment = draft.assessment();
            output_success(
                &output_format,
                &format!(
                    "Risk {} created (score {}, {})",
                    draft.risk_id, assessment.risk_score, assessment.risk_level
                ),
                Some(json!({ "risk": created, "assessment": assessment })),
            )
        }

        RiskCommands::Update { id, fields } => {
            let existing = client.get_risk(&id).await?;
            let mut draft = RiskDraft::from_risk(&existing);
            fields.apply(&mut draft);

            let updated = client.update_risk(&id, &mut draft).await?;
            let assessment = draft.assessment();
            output_success(
                &output_format,
                &format!(
                    "Risk {} updated (score {}, {})",
                    draft.risk_id, assessment.risk_score, assessment.risk_level
                ),
                Some(json!({ "risk": updated, "assessment": assessment })),
            )
        }

        RiskCommands::Delete { id } => {
            client.delete_risk(&id).await?;
            output_success(&output_format, &format!("Risk '{}' deleted", id), Some(json!({ "id": id })))
        }

        RiskCommands::Score {
            confidentiality,
            integrity,
            availability,
            likelihood,
        } => {
            let inputs = RiskInputs::from_values(
                &Value::String(confidentiality),
                &Value::String(integrity),
                &Value::String(availability),
                &Value::String(likelihood),
            );
            let assessment = score(&inputs);

            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&assessment)?),
                OutputFormat::Text => println!(
                    "Impact: {}\nScore: {}\nLevel: {}",
                    assessment.impact, assessment.risk_score, assessment.risk_level
                ),
            }
            Ok(())
        }
    }
}

fn print_risk_table(risks: &[Risk]) {
    println!(
        "{:<12} {:<36} {:<16} {:<12} {:>5} {:<7} {}",
        "RISK ID", "DESCRIPTION", "DEPARTMENT", "TYPE", "SCORE", "LEVEL", "STATUS"
    );
    println!("{}", "-".repeat(100));

    for risk in risks {
        println!(
            "{:<12} {:<36} {:<16} {:<12} {:>5} {:<7} {}",
            truncate(&risk.risk_id, 12),
            truncate(&risk.risk_description, 36),
            truncate(&risk.department, 16),
            risk.risk_type,
            risk.risk_score,
            risk.risk_level,
            risk.status
        );
    }
}

fn print_risk(risk: &Risk) {
    println!("Risk {} ({})", risk.risk_id, risk.id);
    println!("Description: {}", risk.risk_description);
    println!("Department: {}", risk.department);
    println!("Type: {}", risk.risk_type);
    println!("Asset: {} [{}]", risk.asset, risk.asset_type);
    println!(
        "Ratings: C={} I={} A={} L={}",
        risk.confidentiality, risk.integrity, risk.availability, risk.likelihood
    );
    println!("Impact: {}  Score: {}  Level: {}", risk.impact, risk.risk_score, risk.risk_level);
    println!("Status: {}", risk.status);
    if let Some(deadline) = risk.deadline() {
        println!("Deadline: {}", deadline);
    }
    if !risk.existing_controls.is_empty() {
        println!("Existing controls: {}", risk.existing_controls);
    }
    if !risk.additional_controls.is_empty() {
        println!("Additional controls: {}", risk.additional_controls);
    }
    if !risk.additional_notes.is_empty() {
        println!("Notes: {}", risk.additional_notes);
    }
}
