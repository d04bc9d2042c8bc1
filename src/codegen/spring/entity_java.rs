use std::fmt::Write;

use crate::codegen::error::ArtifactError;
use crate::codegen::types::{Entity, RelationDescriptor, RelationKind};
use crate::codegen::utils::to_snake_case;

use super::{java_type, time_imports, ServerConfig};

/// Generate the JPA entity class
pub fn generate_entity_java(entity: &Entity, config: &ServerConfig) -> Result<String, ArtifactError> {
    let mut out = String::new();

    writeln!(out, "package {};", config.layer_package("entity"))?;
    writeln!(out)?;
    writeln!(out, "import jakarta.persistence.*;")?;
    writeln!(out, "import lombok.Data;")?;
    if !entity.relations.is_empty() {
        writeln!(out, "import lombok.EqualsAndHashCode;")?;
        writeln!(out, "import lombok.ToString;")?;
    }
    for import in time_imports(entity, config.type_mapping) {
        writeln!(out, "import {};", import)?;
    }
    if entity.has_to_many() {
        writeln!(out, "import java.util.ArrayList;")?;
        writeln!(out, "import java.util.List;")?;
    }
    writeln!(out)?;

    writeln!(out, "@Data")?;
    writeln!(out, "@Entity")?;
    writeln!(out, "@Table(name = \"{}\")", entity.table_name())?;
    writeln!(out, "public class {} {{", entity.name)?;
    writeln!(out, "    @Id")?;
    writeln!(out, "    @GeneratedValue(strategy = GenerationType.IDENTITY)")?;
    writeln!(out, "    private Long id;")?;

    for attr in &entity.attributes {
        let field_type = java_type(config.type_mapping.resolve(attr));
        writeln!(out, "    private {} {};", field_type, attr.name)?;
    }

    for relation in &entity.relations {
        writeln!(out)?;
        write_relation_field(&mut out, entity, relation)?;
    }

    writeln!(out, "}}")?;

    Ok(out)
}

fn write_relation_field(
    out: &mut String,
    entity: &Entity,
    relation: &RelationDescriptor,
) -> Result<(), ArtifactError> {
    let field = relation.field_name();

    match (&relation.kind, &relation.inverse_field) {
        (RelationKind::ManyToMany, _) => {
            let from = to_snake_case(&entity.name);
            let to = to_snake_case(&relation.target);
            writeln!(out, "    @ManyToMany")?;
            writeln!(
                out,
                "    @JoinTable(name = \"{}_{}\", joinColumns = @JoinColumn(name = \"{}_id\"), inverseJoinColumns = @JoinColumn(name = \"{}_id\"))",
                from, to, from, to
            )?;
        }
        (kind, Some(mapped_by)) => {
            writeln!(out, "    @{}(mappedBy = \"{}\")", kind.annotation(), mapped_by)?;
        }
        (kind, None) => {
            writeln!(out, "    @{}", kind.annotation())?;
            if let Some(column) = &relation.owning_key {
                writeln!(out, "    @JoinColumn(name = \"{}\")", column)?;
            }
        }
    }

    writeln!(out, "    @ToString.Exclude")?;
    writeln!(out, "    @EqualsAndHashCode.Exclude")?;

    if relation.is_to_many() {
        writeln!(
            out,
            "    private List<{}> {} = new ArrayList<>();",
            relation.target, field
        )?;
    } else {
        writeln!(out, "    private {} {};", relation.target, field)?;
    }

    Ok(())
}
