//! Formatted output helpers for CLI commands.

use wiredef_common::types::{Definition, DefinitionKind, DefinitionSet, FactoryCallable};

const KINDS: [DefinitionKind; 4] = [
    DefinitionKind::Parameter,
    DefinitionKind::Alias,
    DefinitionKind::Instance,
    DefinitionKind::Factory,
];

/// One-line totals, e.g. `3 definition(s): 1 parameter, 2 instance`.
#[must_use]
pub fn summary(definitions: &DefinitionSet) -> String {
    let counts: Vec<String> = KINDS
        .iter()
        .filter_map(|&kind| {
            let count = definitions.count_kind(kind);
            (count > 0).then(|| format!("{count} {kind}"))
        })
        .collect();

    if counts.is_empty() {
        return "0 definition(s)".to_owned();
    }
    format!("{} definition(s): {}", definitions.len(), counts.join(", "))
}

/// One-line description of a definition for listings.
#[must_use]
pub fn describe(id: &str, definition: &Definition) -> String {
    let detail = match definition {
        Definition::Parameter(_) => String::new(),
        Definition::Alias(alias) => format!(" -> {}", alias.target),
        Definition::Instance(instance) => format!(
            " {} ({} arg(s), {} call(s))",
            instance.class,
            instance.arguments.len(),
            instance.calls.len()
        ),
        Definition::Factory(factory) => match &factory.callable {
            FactoryCallable::Service { reference, method } => format!(" {reference}:{method}"),
            FactoryCallable::Static { type_name, method } => format!(" {type_name}::{method}"),
        },
    };
    format!("{id} [{}]{detail}", definition.kind())
}
