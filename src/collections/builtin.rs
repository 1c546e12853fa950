use crate::environment::Variables;
use crate::http::method::HttpMethod;

use super::{Collection, ParameterLocation, ParameterSource, Scenario, ScenarioParameter};

fn param(name: &str, location: ParameterLocation, field: &str) -> ScenarioParameter {
    ScenarioParameter {
        name: name.to_string(),
        location,
        source: ParameterSource::Field {
            field: field.to_string(),
        },
    }
}

fn scenario(
    name: &str,
    description: &str,
    method: HttpMethod,
    path: &str,
    parameters: Vec<ScenarioParameter>,
) -> Scenario {
    Scenario {
        name: name.to_string(),
        description: description.to_string(),
        method,
        path: path.to_string(),
        parameters,
    }
}

/// Scenarios for the community / plan / membership / session / reservation
/// endpoints.
pub fn builtin() -> Collection {
    use ParameterLocation::{Body, Path, Query};

    let scenarios = vec![
        scenario(
            "get-community-plan",
            "Fetch one community-plan association",
            HttpMethod::Get,
            "/community-plan/{{community_id}}/{{plan_id}}/",
            vec![
                param("community_id", Path, "community_id"),
                param("plan_id", Path, "plan_id"),
            ],
        ),
        scenario(
            "delete-community-plan",
            "Remove a community-plan association",
            HttpMethod::Delete,
            "/community-plan/{{community_id}}/{{plan_id}}/",
            vec![
                param("community_id", Path, "community_id"),
                param("plan_id", Path, "plan_id"),
            ],
        ),
        scenario(
            "create-community-plan",
            "Associate a plan with a community",
            HttpMethod::Post,
            "/community-plan/",
            vec![
                param("community_id", Body, "community_id"),
                param("plan_id", Body, "plan_id"),
            ],
        ),
        scenario(
            "get-plan",
            "Fetch one plan",
            HttpMethod::Get,
            "/plan/{{plan_id}}/",
            vec![param("plan_id", Path, "plan_id")],
        ),
        scenario(
            "create-plan",
            "Create a plan",
            HttpMethod::Post,
            "/plan/",
            vec![
                param("fee", Body, "fee"),
                param("type", Body, "plan_type"),
                param("reservation_limit", Body, "reservation_limit"),
            ],
        ),
        scenario(
            "get-memberships-by-user",
            "List the memberships of a user",
            HttpMethod::Get,
            "/membership/user/{{user_id}}/",
            vec![param("user_id", Path, "user_id")],
        ),
        scenario(
            "create-membership-for-user",
            "Create a membership for a user",
            HttpMethod::Post,
            "/membership/user/{{user_id}}/",
            vec![
                param("user_id", Path, "user_id"),
                param("description", Body, "description"),
                param("start_date", Body, "start_date"),
                param("end_date", Body, "end_date"),
                param("status", Body, "membership_status"),
            ],
        ),
        scenario(
            "fetch-sessions-by-local",
            "List sessions held at a local",
            HttpMethod::Get,
            "/session/",
            vec![param("localIds", Query, "local_id")],
        ),
        scenario(
            "create-session",
            "Schedule a session",
            HttpMethod::Post,
            "/session/",
            vec![
                param("title", Body, "title"),
                param("date", Body, "timestamp"),
                param("capacity", Body, "capacity"),
                param("professional_id", Body, "professional_id"),
            ],
        ),
        scenario(
            "get-reservation",
            "Fetch one reservation",
            HttpMethod::Get,
            "/reservation/{{reservation_id}}/",
            vec![param("reservation_id", Path, "reservation_id")],
        ),
    ];

    Collection {
        name: "builtin".to_string(),
        variables: Variables::new(),
        scenarios,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::case_count;

    #[test]
    fn every_builtin_scenario_is_well_formed() {
        let collection = builtin();
        collection.validate().unwrap();

        for scenario in &collection.scenarios {
            let specs = scenario.specs().unwrap();
            assert_eq!(specs.len(), scenario.parameters.len());
            assert!(case_count(&specs).unwrap() >= 2, "{}", scenario.name);
        }
    }

    #[test]
    fn scenario_names_are_unique() {
        let collection = builtin();
        let mut names: Vec<&str> = collection.scenarios.iter().map(|s| s.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), collection.scenarios.len());
    }

    #[test]
    fn community_plan_lookup_matches_route_shape() {
        let collection = builtin();
        let scenario = collection.find("get-community-plan").unwrap();
        assert_eq!(scenario.method, HttpMethod::Get);
        assert_eq!(scenario.parameters.len(), 2);
    }
}
