pub fn render_schema() -> String {
	expand_includes(include_str!("../../../sql/init.sql"))
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_protocol.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_protocol.sql")),
				"tables/002_agendaitem.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_agendaitem.sql")),
				"tables/003_speaker.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_speaker.sql")),
				"tables/004_speech.sql" =>
					out.push_str(include_str!("../../../sql/tables/004_speech.sql")),
				"tables/005_profiles.sql" =>
					out.push_str(include_str!("../../../sql/tables/005_profiles.sql")),
				"tables/006_search_history.sql" =>
					out.push_str(include_str!("../../../sql/tables/006_search_history.sql")),
				"functions/001_search_speeches_fast.sql" => out
					.push_str(include_str!("../../../sql/functions/001_search_speeches_fast.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}

/// Splits rendered schema SQL into statements.
///
/// Semicolons inside dollar-quoted bodies do not terminate a statement.
pub fn split_statements(sql: &str) -> Vec<String> {
	let mut statements = Vec::new();
	let mut current = String::new();
	let mut in_dollar_quote = false;

	for line in sql.lines() {
		if line.matches("$fn$").count() % 2 == 1 {
			in_dollar_quote = !in_dollar_quote;
		}

		current.push_str(line);
		current.push('\n');

		if !in_dollar_quote && line.trim_end().ends_with(';') {
			push_statement(&mut statements, &current);
			current.clear();
		}
	}

	push_statement(&mut statements, &current);

	statements
}

fn push_statement(statements: &mut Vec<String>, raw: &str) {
	let trimmed = raw.trim().trim_end_matches(';').trim();

	if !trimmed.is_empty() {
		statements.push(trimmed.to_string());
	}
}
