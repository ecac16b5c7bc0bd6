// Client-side narrowing of list results

use super::{Department, Organization, Risk, Role, User};

/// Records that belong to an organization
pub trait OrganizationScoped {
    fn organization(&self) -> Option<&str>;
}

/// Records that can be matched against a free-text search term
pub trait Searchable {
    /// Text the search term is matched against
    fn search_text(&self) -> String;
}

impl OrganizationScoped for Risk {
    fn organization(&self) -> Option<&str> {
        self.organization.as_deref()
    }
}

impl OrganizationScoped for Department {
    fn organization(&self) -> Option<&str> {
        self.organization.as_deref()
    }
}

impl OrganizationScoped for User {
    fn organization(&self) -> Option<&str> {
        self.organization.as_deref()
    }
}

impl Searchable for Risk {
    fn search_text(&self) -> String {
        [
            self.risk_id.as_str(),
            self.risk_description.as_str(),
            self.department.as_str(),
            self.risk_type.as_str(),
            self.risk_level.as_str(),
        ]
        .join(" ")
    }
}

impl Searchable for User {
    fn search_text(&self) -> String {
        [
            self.name.as_str(),
            self.email.as_str(),
            self.role.as_str(),
            self.department_label(),
        ]
        .join(" ")
    }
}

impl Searchable for Department {
    fn search_text(&self) -> String {
        self.name.clone()
    }
}

impl Searchable for Organization {
    fn search_text(&self) -> String {
        self.name.clone()
    }
}

/// Keep records whose searchable text contains `term`, ignoring case.
/// An empty term keeps everything.
pub fn search<T: Searchable>(items: Vec<T>, term: &str) -> Vec<T> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return items;
    }

    items
        .into_iter()
        .filter(|item| item.search_text().to_lowercase().contains(&needle))
        .collect()
}

/// Root users only see records of their own organization. Other roles, and
/// root users without an organization, see everything.
pub fn scope_to_organization<T: OrganizationScoped>(
    items: Vec<T>,
    role: Role,
    organization: Option<&str>,
) -> Vec<T> {
    match (role, organization) {
        (Role::Root, Some(org)) => filter_by_organization(items, org),
        _ => items,
    }
}

/// Keep records that belong to `organization`
pub fn filter_by_organization<T: OrganizationScoped>(items: Vec<T>, organization: &str) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| item.organization() == Some(organization))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn risk(id: &str, org: &str, description: &str) -> Risk {
        serde_json::from_value(json!({
            "_id": id,
            "riskId": id,
            "riskDescription": description,
            "department": "Finance",
            "organization": org,
            "riskType": "Operational",
            "riskLevel": "Medium"
        }))
        .unwrap()
    }

    fn department(name: &str, org: Option<&str>) -> Department {
        Department {
            id: name.to_lowercase(),
            name: name.to_string(),
            organization: org.map(str::to_string),
        }
    }

    #[test]
    fn test_search_matches_any_listed_field() {
        let risks = vec![
            risk("R-1", "acme", "Payroll fraud"),
            risk("R-2", "acme", "Server outage"),
        ];

        let hits = search(risks.clone(), "PAYROLL");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].risk_id, "R-1");

        assert_eq!(search(risks.clone(), "operational").len(), 2);
        assert_eq!(search(risks.clone(), "  ").len(), 2);
        assert!(search(risks, "nothing like this").is_empty());
    }

    #[test]
    fn test_root_sees_only_own_organization() {
        let risks = vec![
            risk("R-1", "acme", "a"),
            risk("R-2", "globex", "b"),
            risk("R-3", "acme", "c"),
        ];

        let scoped = scope_to_organization(risks.clone(), Role::Root, Some("acme"));
        let ids: Vec<_> = scoped.iter().map(|r| r.risk_id.as_str()).collect();
        assert_eq!(ids, vec!["R-1", "R-3"]);

        assert_eq!(scope_to_organization(risks.clone(), Role::Root, None).len(), 3);
        assert_eq!(
            scope_to_organization(risks, Role::SuperAdmin, Some("acme")).len(),
            3
        );
    }

    #[test]
    fn test_filter_by_organization_drops_unscoped_records() {
        let departments = vec![
            department("Finance", Some("acme")),
            department("Legal", None),
            department("Ops", Some("globex")),
        ];

        let kept = filter_by_organization(departments, "acme");
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "Finance");
    }
}
