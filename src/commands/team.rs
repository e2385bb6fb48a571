use crate::client::JiraClient;
use crate::config::Config;
use crate::error::Result;
use crate::output;
use crate::requests;
use crate::types::{Person, TeamFile};

/// Split a Jira display name into first and last name, trying the common
/// separators in turn.
fn split_display_name(display_name: &str) -> (String, String) {
    let split = display_name
        .split_once(' ')
        .or_else(|| display_name.split_once('.'))
        .or_else(|| display_name.split_once(','));

    match split {
        Some((first, last)) => (first.to_string(), last.to_string()),
        None => (display_name.to_string(), "PLEASE-FILL".to_string()),
    }
}

fn person_code(first_name: &str, last_name: &str) -> String {
    first_name
        .chars()
        .next()
        .into_iter()
        .chain(last_name.chars().next())
        .collect::<String>()
        .to_uppercase()
}

/// Append position numbers to codes shared by several people, so "AB"
/// held twice becomes "AB1" and "AB2".
fn disambiguate_codes(people: &mut [Person]) {
    let codes: Vec<String> = people.iter().map(|p| p.code.clone()).collect();

    for (idx, person) in people.iter_mut().enumerate() {
        let total = codes.iter().filter(|c| **c == codes[idx]).count();
        if total > 1 {
            let earlier = codes[..idx].iter().filter(|c| **c == codes[idx]).count();
            person.code = format!("{}{}", codes[idx], earlier + 1);
        }
    }
}

/// Draft a team roster from the server's user directory. The generated
/// file is a starting point: user names and daily capacities are meant to
/// be adjusted by hand.
pub async fn create_file(
    client: &JiraClient,
    config: &Config,
    project_key: Option<&str>,
) -> Result<()> {
    config.project_key(project_key)?;

    let users = requests::users(client).await?;

    let mut people: Vec<Person> = users
        .into_iter()
        .filter(|user| user.account_type == "atlassian")
        .map(|user| {
            let (first_name, last_name) = split_display_name(&user.display_name);
            Person {
                code: person_code(&first_name, &last_name),
                last_name,
                first_name,
                user_name: String::new(),
                account_id: user.account_id,
                daily_capacity: 1,
            }
        })
        .collect();

    disambiguate_codes(&mut people);

    output::print_json(&TeamFile { people });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(code: &str) -> Person {
        Person {
            code: code.to_string(),
            last_name: "Smith".to_string(),
            first_name: "John".to_string(),
            user_name: String::new(),
            account_id: "acc".to_string(),
            daily_capacity: 1,
        }
    }

    #[test]
    fn display_names_split_on_space_dot_or_comma() {
        assert_eq!(
            split_display_name("John Smith"),
            ("John".to_string(), "Smith".to_string())
        );
        assert_eq!(
            split_display_name("john.smith"),
            ("john".to_string(), "smith".to_string())
        );
        assert_eq!(
            split_display_name("Smith,John"),
            ("Smith".to_string(), "John".to_string())
        );
        assert_eq!(
            split_display_name("Cher"),
            ("Cher".to_string(), "PLEASE-FILL".to_string())
        );
    }

    #[test]
    fn space_wins_over_the_other_separators() {
        assert_eq!(
            split_display_name("John Smith.Jones"),
            ("John".to_string(), "Smith.Jones".to_string())
        );
    }

    #[test]
    fn codes_take_the_uppercased_initials() {
        assert_eq!(person_code("john", "smith"), "JS");
        assert_eq!(person_code("Ann", ""), "A");
    }

    #[test]
    fn shared_codes_are_numbered_in_order() {
        let mut people = vec![person("AB"), person("CD"), person("AB"), person("AB")];

        disambiguate_codes(&mut people);

        let codes: Vec<&str> = people.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(codes, vec!["AB1", "CD", "AB2", "AB3"]);
    }
}
