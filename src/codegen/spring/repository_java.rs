use std::fmt::Write;

use crate::codegen::error::ArtifactError;
use crate::codegen::types::Entity;

use super::ServerConfig;

/// Generate the Spring Data repository interface
pub fn generate_repository_java(
    entity: &Entity,
    config: &ServerConfig,
) -> Result<String, ArtifactError> {
    let mut out = String::new();

    writeln!(out, "package {};", config.layer_package("repository"))?;
    writeln!(out)?;
    writeln!(out, "import {}.{};", config.layer_package("entity"), entity.name)?;
    writeln!(out, "import org.springframework.data.jpa.repository.JpaRepository;")?;
    writeln!(out, "import org.springframework.stereotype.Repository;")?;
    writeln!(out)?;
    writeln!(out, "@Repository")?;
    writeln!(
        out,
        "public interface {}Repository extends JpaRepository<{}, Long> {{",
        entity.name, entity.name
    )?;
    writeln!(out, "}}")?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::types::NodeKind;

    #[test]
    fn test_repository() {
        let entity = Entity::new(1, "OrderItem", NodeKind::Standard);
        let java = generate_repository_java(&entity, &ServerConfig::default()).unwrap();

        assert!(java.contains("import com.example.demo.entity.OrderItem;"));
        assert!(java.contains(
            "public interface OrderItemRepository extends JpaRepository<OrderItem, Long> {"
        ));
    }
}
