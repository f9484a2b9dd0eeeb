use super::tables::{get_table, ALL_TABLES};
use super::types::TableSchema;
use std::collections::{HashMap, HashSet, VecDeque};

/// Resolves table dependencies for filtering
pub struct DependencyResolver {
    /// Map of table name -> tables it depends on
    deps: HashMap<&'static str, HashSet<&'static str>>,
    /// Map of table name -> tables that depend on it
    reverse_deps: HashMap<&'static str, HashSet<&'static str>>,
}

impl DependencyResolver {
    pub fn new() -> Self {
        let mut deps: HashMap<&'static str, HashSet<&'static str>> = HashMap::new();
        let mut reverse_deps: HashMap<&'static str, HashSet<&'static str>> = HashMap::new();

        for table in ALL_TABLES {
            let table_deps = table.dependencies();
            for &dep in &table_deps {
                reverse_deps.entry(dep).or_default().insert(table.name);
            }
            deps.insert(table.name, table_deps);
        }

        Self { deps, reverse_deps }
    }

    /// Given a set of requested tables, resolve all required dependencies
    /// Returns tables in dependency order (parents before children)
    pub fn resolve_includes(
        &self,
        requested: &[&str],
    ) -> Result<Vec<&'static TableSchema>, String> {
        let mut included: HashSet<&'static str> = HashSet::new();
        let mut queue: VecDeque<&'static TableSchema> = VecDeque::new();

        for name in requested {
            let table = get_table(name).ok_or_else(|| format!("Unknown table: {}", name))?;
            queue.push_back(table);
        }

        while let Some(table) = queue.pop_front() {
            if !included.insert(table.name) {
                continue;
            }

            // FK parents, then association tables filled alongside this one
            let parents = self.deps.get(table.name).into_iter().flatten().copied();
            for name in parents.chain(table.child_tables.iter().copied()) {
                if !included.contains(name) {
                    let next = get_table(name).ok_or_else(|| format!("Unknown table: {}", name))?;
                    queue.push_back(next);
                }
            }
        }

        self.topological_sort(&included)
    }

    /// Given a set of tables to exclude, return remaining tables in order.
    /// Anything that (transitively) references an excluded table is dropped too.
    pub fn resolve_excludes(&self, excluded: &[&str]) -> Result<Vec<&'static TableSchema>, String> {
        let mut dropped: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();

        for name in excluded {
            let table = get_table(name).ok_or_else(|| format!("Unknown table: {}", name))?;
            queue.push_back(table.name);
        }

        while let Some(name) = queue.pop_front() {
            if !dropped.insert(name) {
                continue;
            }
            if let Some(dependents) = self.reverse_deps.get(name) {
                queue.extend(dependents.iter().copied());
            }
        }

        let included: HashSet<&str> = ALL_TABLES
            .iter()
            .map(|t| t.name)
            .filter(|name| !dropped.contains(name))
            .collect();

        self.topological_sort(&included)
    }

    /// Return all tables in dependency order
    pub fn all_tables_ordered(&self) -> Vec<&'static TableSchema> {
        ALL_TABLES.to_vec()
    }

    /// Topological sort of tables by dependencies.
    /// Ties are broken by registry order so the output is stable.
    fn topological_sort(
        &self,
        included: &HashSet<&str>,
    ) -> Result<Vec<&'static TableSchema>, String> {
        let mut result = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut temp_visited: HashSet<&str> = HashSet::new();

        for table in ALL_TABLES.iter().filter(|t| included.contains(t.name)) {
            self.visit(
                table.name,
                included,
                &mut visited,
                &mut temp_visited,
                &mut result,
            )?;
        }

        Ok(result)
    }

    fn visit<'a>(
        &self,
        name: &'a str,
        included: &HashSet<&str>,
        visited: &mut HashSet<&'a str>,
        temp_visited: &mut HashSet<&'a str>,
        result: &mut Vec<&'static TableSchema>,
    ) -> Result<(), String> {
        if temp_visited.contains(name) {
            return Err(format!("Circular dependency detected at: {}", name));
        }
        if visited.contains(name) {
            return Ok(());
        }

        temp_visited.insert(name);

        if let Some(deps) = self.deps.get(name) {
            let mut deps: Vec<&'static str> = deps
                .iter()
                .copied()
                .filter(|dep| included.contains(dep))
                .collect();
            deps.sort_by_key(|dep| registry_position(dep));
            for dep in deps {
                self.visit(dep, included, visited, temp_visited, result)?;
            }
        }

        temp_visited.remove(name);
        visited.insert(name);

        if let Some(table) = get_table(name) {
            result.push(table);
        }

        Ok(())
    }
}

impl Default for DependencyResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn registry_position(name: &str) -> usize {
    ALL_TABLES
        .iter()
        .position(|t| t.name == name)
        .unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(tables: &[&TableSchema]) -> Vec<&'static str> {
        tables.iter().map(|t| t.name).collect()
    }

    fn position(names: &[&str], name: &str) -> usize {
        names.iter().position(|&n| n == name).unwrap()
    }

    #[test]
    fn test_resolve_base_stats_includes_parents() {
        let resolver = DependencyResolver::new();
        let tables = resolver.resolve_includes(&["base_stats"]).unwrap();
        let names = names(&tables);

        assert!(names.contains(&"base_stats"));
        assert!(names.contains(&"pokemons"));
        assert!(names.contains(&"types"));
        assert!(names.contains(&"abilities"));

        // Parents should come before children
        assert!(position(&names, "types") < position(&names, "pokemons"));
        assert!(position(&names, "pokemons") < position(&names, "base_stats"));
    }

    #[test]
    fn test_resolve_pokemons_pulls_association_tables() {
        let resolver = DependencyResolver::new();
        let tables = resolver.resolve_includes(&["pokemons"]).unwrap();
        let names = names(&tables);

        assert!(names.contains(&"types_poke_group"));
        assert!(names.contains(&"abilities_poke_group"));
        assert!(!names.contains(&"base_stats"));
        assert!(!names.contains(&"breeding_egg_group"));
        assert!(position(&names, "pokemons") < position(&names, "types_poke_group"));
    }

    #[test]
    fn test_resolve_lookup_table_alone() {
        let resolver = DependencyResolver::new();
        let tables = resolver.resolve_includes(&["growth_rate_categories"]).unwrap();
        assert_eq!(names(&tables), vec!["growth_rate_categories"]);
    }

    #[test]
    fn test_exclude_drops_dependents_transitively() {
        let resolver = DependencyResolver::new();
        let tables = resolver.resolve_excludes(&["types"]).unwrap();
        let names = names(&tables);

        assert!(!names.contains(&"types"));
        assert!(!names.contains(&"pokemons"));
        assert!(!names.contains(&"breeding_stats"));
        // breeding_egg_group depends on pokemons only through breeding_stats
        assert!(!names.contains(&"breeding_egg_group"));
        assert!(names.contains(&"egg_groups"));
        assert!(names.contains(&"abilities"));
    }

    #[test]
    fn test_ordering_is_stable() {
        let resolver = DependencyResolver::new();
        let first = names(&resolver.resolve_excludes(&[]).unwrap());
        let second = names(&resolver.resolve_excludes(&[]).unwrap());
        assert_eq!(first, second);
        assert_eq!(first, names(&resolver.all_tables_ordered()));
    }

    #[test]
    fn test_unknown_table_error() {
        let resolver = DependencyResolver::new();
        assert!(resolver.resolve_includes(&["nonexistent"]).is_err());
        assert!(resolver.resolve_excludes(&["nonexistent"]).is_err());
    }
}
