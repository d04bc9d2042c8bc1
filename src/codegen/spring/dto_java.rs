use std::fmt::Write;

use crate::codegen::error::ArtifactError;
use crate::codegen::types::{Entity, FieldType};
use crate::codegen::utils::{capitalize, escape_java_string};

use super::{java_type, time_imports, ServerConfig};

fn write_header(
    out: &mut String,
    entity: &Entity,
    config: &ServerConfig,
    imports: &[String],
) -> Result<(), ArtifactError> {
    writeln!(out, "package {};", config.layer_package("dto"))?;
    writeln!(out)?;
    for import in imports {
        writeln!(out, "import {};", import)?;
    }
    writeln!(out, "import lombok.Data;")?;
    for import in time_imports(entity, config.type_mapping) {
        writeln!(out, "import {};", import)?;
    }
    writeln!(out)?;
    Ok(())
}

/// Generate the create DTO: attributes are required, plus one id per owned foreign key
pub fn generate_create_dto_java(
    entity: &Entity,
    config: &ServerConfig,
) -> Result<String, ArtifactError> {
    let mut out = String::new();
    let mapping = config.type_mapping;

    let needs_not_blank = entity
        .attributes
        .iter()
        .any(|a| mapping.resolve(a) == FieldType::String);
    let needs_not_null = entity.owned_foreign_keys().next().is_some()
        || entity
            .attributes
            .iter()
            .any(|a| mapping.resolve(a) != FieldType::String);

    let mut imports = Vec::new();
    if needs_not_blank {
        imports.push("jakarta.validation.constraints.NotBlank".to_string());
    }
    if needs_not_null {
        imports.push("jakarta.validation.constraints.NotNull".to_string());
    }
    write_header(&mut out, entity, config, &imports)?;

    writeln!(out, "@Data")?;
    writeln!(out, "public class Create{}Dto {{", entity.name)?;

    let mut first = true;
    for attr in &entity.attributes {
        if !first {
            writeln!(out)?;
        }
        first = false;
        let field_type = mapping.resolve(attr);
        let constraint = if field_type == FieldType::String { "NotBlank" } else { "NotNull" };
        let message = escape_java_string(&format!("{} is required", attr.name));
        writeln!(out, "    @{}(message = \"{}\")", constraint, message)?;
        writeln!(out, "    private {} {};", java_type(field_type), attr.name)?;
    }

    for relation in entity.owned_foreign_keys() {
        if !first {
            writeln!(out)?;
        }
        first = false;
        let message = escape_java_string(&format!("{} ID is required", relation.target));
        writeln!(out, "    @NotNull(message = \"{}\")", message)?;
        writeln!(out, "    private Long {};", relation.id_field_name())?;
    }

    writeln!(out, "}}")?;
    Ok(out)
}

/// Generate the update DTO: every field optional, `null` means unchanged
pub fn generate_update_dto_java(
    entity: &Entity,
    config: &ServerConfig,
) -> Result<String, ArtifactError> {
    let mut out = String::new();
    write_header(&mut out, entity, config, &[])?;

    writeln!(out, "@Data")?;
    writeln!(out, "public class Update{}Dto {{", entity.name)?;
    for attr in &entity.attributes {
        let field_type = java_type(config.type_mapping.resolve(attr));
        writeln!(out, "    private {} {};", field_type, attr.name)?;
    }
    for relation in entity.owned_foreign_keys() {
        writeln!(out, "    private Long {};", relation.id_field_name())?;
    }
    writeln!(out, "}}")?;

    Ok(out)
}

/// Generate the response DTO.
///
/// The entity constructor maps attributes and relation ids only. The static
/// `withRelations` factory adds nested to-one objects built with that
/// constructor, so nesting stops after one level.
pub fn generate_response_dto_java(
    entity: &Entity,
    config: &ServerConfig,
) -> Result<String, ArtifactError> {
    let mut out = String::new();
    let name = &entity.name;
    let var = entity.var_name();
    let class = format!("{}ResponseDto", name);

    let mut imports = vec![format!("{}.{}", config.layer_package("entity"), name)];
    if entity.has_to_many() {
        imports.push("java.util.ArrayList".to_string());
        imports.push("java.util.List".to_string());
        imports.push("java.util.stream.Collectors".to_string());
    }
    imports.push("lombok.NoArgsConstructor".to_string());
    write_header(&mut out, entity, config, &imports)?;

    writeln!(out, "@Data")?;
    writeln!(out, "@NoArgsConstructor")?;
    writeln!(out, "public class {} {{", class)?;
    writeln!(out, "    private Long id;")?;
    for attr in &entity.attributes {
        let field_type = java_type(config.type_mapping.resolve(attr));
        writeln!(out, "    private {} {};", field_type, attr.name)?;
    }
    for relation in &entity.relations {
        if relation.is_to_many() {
            writeln!(
                out,
                "    private List<Long> {} = new ArrayList<>();",
                relation.ids_field_name()
            )?;
        } else {
            writeln!(out, "    private Long {};", relation.id_field_name())?;
            writeln!(
                out,
                "    private {}ResponseDto {};",
                relation.target,
                relation.field_name()
            )?;
        }
    }
    writeln!(out)?;

    writeln!(out, "    public {}({} {}) {{", class, name, var)?;
    writeln!(out, "        this.id = {}.getId();", var)?;
    for attr in &entity.attributes {
        writeln!(out, "        this.{} = {}.get{}();", attr.name, var, capitalize(&attr.name))?;
    }
    for relation in &entity.relations {
        let getter = format!("{}.get{}()", var, capitalize(&relation.field_name()));
        writeln!(out, "        if ({} != null) {{", getter)?;
        if relation.is_to_many() {
            writeln!(out, "            this.{} = {}.stream()", relation.ids_field_name(), getter)?;
            writeln!(out, "                .map(related -> related.getId())")?;
            writeln!(out, "                .collect(Collectors.toList());")?;
        } else {
            writeln!(out, "            this.{} = {}.getId();", relation.id_field_name(), getter)?;
        }
        writeln!(out, "        }}")?;
    }
    writeln!(out, "    }}")?;
    writeln!(out)?;

    writeln!(out, "    public static {} withRelations({} {}) {{", class, name, var)?;
    writeln!(out, "        {} dto = new {}({});", class, class, var)?;
    for relation in entity.relations.iter().filter(|r| !r.is_to_many()) {
        let getter = format!("{}.get{}()", var, capitalize(&relation.field_name()));
        writeln!(out, "        if ({} != null) {{", getter)?;
        writeln!(
            out,
            "            dto.set{}(new {}ResponseDto({}));",
            capitalize(&relation.field_name()),
            relation.target,
            getter
        )?;
        writeln!(out, "        }}")?;
    }
    writeln!(out, "        return dto;")?;
    writeln!(out, "    }}")?;
    writeln!(out, "}}")?;

    Ok(out)
}
