pub fn render_schema() -> String {
	let init = include_str!("../../../sql/init.sql");

	expand_includes(init)
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_users.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_users.sql")),
				"tables/002_travel_plans.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_travel_plans.sql")),
				"tables/003_posts.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_posts.sql")),
				"tables/004_likes.sql" =>
					out.push_str(include_str!("../../../sql/tables/004_likes.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn includes_are_expanded() {
		let sql = render_schema();

		assert!(!sql.contains("\\ir "));

		for table in ["users", "travel_plans", "posts", "likes"] {
			assert!(
				sql.contains(&format!("CREATE TABLE IF NOT EXISTS {table} (")),
				"Missing table {table}."
			);
		}
	}

	#[test]
	fn statements_split_cleanly_on_semicolons() {
		let sql = render_schema();
		let statements = sql.split(';').filter(|statement| !statement.trim().is_empty()).count();

		assert_eq!(statements, 10);
	}
}
