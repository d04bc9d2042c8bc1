use std::fmt::Write;

use crate::codegen::dependency_graph::{Resolver, ServiceDependency};
use crate::codegen::error::ArtifactError;
use crate::codegen::types::{Entity, RelationDescriptor};
use crate::codegen::utils::{capitalize, lower_first};

use super::ServerConfig;

/// Generate the service class.
///
/// Owning to-one relations are resolved by id through the component listed in
/// `dependencies`; a missing target leaves the relation unset.
pub fn generate_service_java(
    entity: &Entity,
    dependencies: &[ServiceDependency],
    config: &ServerConfig,
) -> Result<String, ArtifactError> {
    let mut out = String::new();
    let name = &entity.name;
    let var = entity.var_name();
    let repository = format!("{}Repository", lower_first(name));

    // Every owned foreign key target except the entity itself gets one collaborator
    let mut wired: Vec<ServiceDependency> = Vec::new();
    for relation in entity.owned_foreign_keys() {
        if relation.target != *name && !wired.iter().any(|d| d.target == relation.target) {
            wired.push(ServiceDependency {
                target: relation.target.clone(),
                resolver: resolver_for(&relation.target, dependencies),
            });
        }
    }
    let injected: Vec<(String, String)> = wired.iter().map(collaborator).collect();

    writeln!(out, "package {};", config.layer_package("service"))?;
    writeln!(out)?;
    writeln!(out, "import {}.{};", config.layer_package("entity"), name)?;
    for dependency in &wired {
        writeln!(out, "import {}.{};", config.layer_package("entity"), dependency.target)?;
    }
    writeln!(out, "import {}.Create{}Dto;", config.layer_package("dto"), name)?;
    writeln!(out, "import {}.Update{}Dto;", config.layer_package("dto"), name)?;
    writeln!(out, "import {}.{}Repository;", config.layer_package("repository"), name)?;
    for dependency in &wired {
        if dependency.resolver == Resolver::Repository {
            writeln!(
                out,
                "import {}.{}Repository;",
                config.layer_package("repository"),
                dependency.target
            )?;
        }
    }
    writeln!(out, "import org.springframework.stereotype.Service;")?;
    writeln!(out)?;
    writeln!(out, "import java.util.List;")?;
    writeln!(out)?;

    writeln!(out, "@Service")?;
    writeln!(out, "public class {}Service {{", name)?;
    writeln!(out)?;
    writeln!(out, "    private final {}Repository {};", name, repository)?;
    for (class, field) in &injected {
        writeln!(out, "    private final {} {};", class, field)?;
    }
    writeln!(out)?;

    // Constructor injection
    let mut params = vec![format!("{}Repository {}", name, repository)];
    params.extend(injected.iter().map(|(class, field)| format!("{} {}", class, field)));
    writeln!(out, "    public {}Service({}) {{", name, params.join(", "))?;
    writeln!(out, "        this.{} = {};", repository, repository)?;
    for (_, field) in &injected {
        writeln!(out, "        this.{} = {};", field, field)?;
    }
    writeln!(out, "    }}")?;
    writeln!(out)?;

    writeln!(out, "    public {} findById(Long id) {{", name)?;
    writeln!(out, "        return {}.findById(id).orElse(null);", repository)?;
    writeln!(out, "    }}")?;
    writeln!(out)?;

    writeln!(out, "    public List<{}> findAll() {{", name)?;
    writeln!(out, "        return {}.findAll();", repository)?;
    writeln!(out, "    }}")?;
    writeln!(out)?;

    // create
    writeln!(out, "    public {} create(Create{}Dto createDto) {{", name, name)?;
    writeln!(out, "        {} {} = new {}();", name, var, name)?;
    for attr in &entity.attributes {
        let accessor = capitalize(&attr.name);
        writeln!(out, "        {}.set{}(createDto.get{}());", var, accessor, accessor)?;
    }
    for relation in entity.owned_foreign_keys() {
        writeln!(out)?;
        write_relation_lookup(&mut out, entity, relation, dependencies, "createDto", &var)?;
    }
    writeln!(out)?;
    writeln!(out, "        return {}.save({});", repository, var)?;
    writeln!(out, "    }}")?;
    writeln!(out)?;

    // update: absent fields leave the stored value unchanged
    let existing = format!("existing{}", name);
    writeln!(out, "    public {} update(Long id, Update{}Dto updateDto) {{", name, name)?;
    writeln!(out, "        {} {} = {}.findById(id).orElse(null);", name, existing, repository)?;
    writeln!(out, "        if ({} == null) {{", existing)?;
    writeln!(out, "            return null;")?;
    writeln!(out, "        }}")?;
    for attr in &entity.attributes {
        let accessor = capitalize(&attr.name);
        writeln!(out)?;
        writeln!(out, "        if (updateDto.get{}() != null) {{", accessor)?;
        writeln!(out, "            {}.set{}(updateDto.get{}());", existing, accessor, accessor)?;
        writeln!(out, "        }}")?;
    }
    for relation in entity.owned_foreign_keys() {
        writeln!(out)?;
        write_relation_lookup(&mut out, entity, relation, dependencies, "updateDto", &existing)?;
    }
    writeln!(out)?;
    writeln!(out, "        return {}.save({});", repository, existing)?;
    writeln!(out, "    }}")?;
    writeln!(out)?;

    writeln!(out, "    public void deleteById(Long id) {{")?;
    writeln!(out, "        {}.deleteById(id);", repository)?;
    writeln!(out, "    }}")?;
    writeln!(out, "}}")?;

    Ok(out)
}

/// Class and field name of an injected collaborator
fn collaborator(dependency: &ServiceDependency) -> (String, String) {
    let suffix = match dependency.resolver {
        Resolver::Service => "Service",
        Resolver::Repository => "Repository",
    };
    (
        format!("{}{}", dependency.target, suffix),
        format!("{}{}", lower_first(&dependency.target), suffix),
    )
}

/// Resolver chosen by the dependency graph; unlisted targets go through their repository
fn resolver_for(target: &str, dependencies: &[ServiceDependency]) -> Resolver {
    dependencies
        .iter()
        .find(|d| d.target == target)
        .map(|d| d.resolver)
        .unwrap_or(Resolver::Repository)
}

/// Expression looking up `target` by `id_expr`, yielding `null` when absent
fn lookup_expression(
    entity: &Entity,
    target: &str,
    dependencies: &[ServiceDependency],
    id_expr: &str,
) -> String {
    if target == entity.name {
        return format!("findById({})", id_expr);
    }

    let resolver = resolver_for(target, dependencies);

    let (_, field) = collaborator(&ServiceDependency {
        target: target.to_string(),
        resolver,
    });
    match resolver {
        Resolver::Service => format!("{}.findById({})", field, id_expr),
        Resolver::Repository => format!("{}.findById({}).orElse(null)", field, id_expr),
    }
}

fn write_relation_lookup(
    out: &mut String,
    entity: &Entity,
    relation: &RelationDescriptor,
    dependencies: &[ServiceDependency],
    dto: &str,
    subject: &str,
) -> Result<(), ArtifactError> {
    let field = relation.field_name();
    let local = if field == subject {
        format!("related{}", capitalize(&field))
    } else {
        field.clone()
    };
    let getter = format!("{}.get{}()", dto, capitalize(&relation.id_field_name()));
    let lookup = lookup_expression(entity, &relation.target, dependencies, &getter);

    writeln!(out, "        if ({} != null) {{", getter)?;
    writeln!(out, "            {} {} = {};", relation.target, local, lookup)?;
    writeln!(out, "            if ({} != null) {{", local)?;
    writeln!(out, "                {}.set{}({});", subject, capitalize(&field), local)?;
    writeln!(out, "            }}")?;
    writeln!(out, "        }}")?;

    Ok(())
}
