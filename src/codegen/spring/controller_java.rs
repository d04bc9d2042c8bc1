use std::fmt::Write;

use crate::codegen::error::ArtifactError;
use crate::codegen::types::Entity;
use crate::codegen::utils::{escape_java_string, lower_first};

use super::ServerConfig;

/// Request path of an entity's controller (`api/order-items`)
pub fn controller_path(entity: &Entity, config: &ServerConfig) -> String {
    let prefix = config.api_prefix.trim_matches('/');
    if prefix.is_empty() {
        entity.route_segment()
    } else {
        format!("{}/{}", prefix, entity.route_segment())
    }
}

/// Generate the REST controller
pub fn generate_controller_java(
    entity: &Entity,
    config: &ServerConfig,
) -> Result<String, ArtifactError> {
    let mut out = String::new();
    let name = &entity.name;
    let var = entity.var_name();
    let plural = entity.plural_var_name();
    let service = format!("{}Service", lower_first(name));
    let response = format!("{}ResponseDto", name);

    writeln!(out, "package {};", config.layer_package("controller"))?;
    writeln!(out)?;
    writeln!(out, "import {}.{};", config.layer_package("entity"), name)?;
    writeln!(out, "import {}.Create{}Dto;", config.layer_package("dto"), name)?;
    writeln!(out, "import {}.Update{}Dto;", config.layer_package("dto"), name)?;
    writeln!(out, "import {}.{};", config.layer_package("dto"), response)?;
    writeln!(out, "import {}.{}Service;", config.layer_package("service"), name)?;
    writeln!(out, "import jakarta.validation.Valid;")?;
    writeln!(out, "import org.springframework.http.ResponseEntity;")?;
    writeln!(out, "import org.springframework.web.bind.annotation.*;")?;
    writeln!(out)?;
    writeln!(out, "import java.util.List;")?;
    writeln!(out, "import java.util.stream.Collectors;")?;
    writeln!(out)?;

    writeln!(out, "@RestController")?;
    writeln!(out, "@RequestMapping(path = \"{}\")", controller_path(entity, config))?;
    writeln!(out, "public class {}Controller {{", name)?;
    writeln!(out)?;
    writeln!(out, "    private final {}Service {};", name, service)?;
    writeln!(out)?;
    writeln!(out, "    public {}Controller({}Service {}) {{", name, name, service)?;
    writeln!(out, "        this.{} = {};", service, service)?;
    writeln!(out, "    }}")?;
    writeln!(out)?;

    writeln!(out, "    @GetMapping")?;
    writeln!(out, "    public ResponseEntity<List<{}>> findAll() {{", response)?;
    writeln!(out, "        List<{}> {} = {}.findAll();", name, plural, service)?;
    writeln!(out, "        List<{}> response = {}.stream()", response, plural)?;
    writeln!(out, "            .map({}::new)", response)?;
    writeln!(out, "            .collect(Collectors.toList());")?;
    writeln!(out, "        return ResponseEntity.ok(response);")?;
    writeln!(out, "    }}")?;
    writeln!(out)?;

    writeln!(out, "    @GetMapping(\"/{{id}}\")")?;
    writeln!(out, "    public ResponseEntity<{}> findById(@PathVariable Long id) {{", response)?;
    writeln!(out, "        {} {} = {}.findById(id);", name, var, service)?;
    writeln!(out, "        if ({} == null) {{", var)?;
    writeln!(out, "            return ResponseEntity.notFound().build();")?;
    writeln!(out, "        }}")?;
    writeln!(out, "        return ResponseEntity.ok({}.withRelations({}));", response, var)?;
    writeln!(out, "    }}")?;
    writeln!(out)?;

    writeln!(out, "    @PostMapping")?;
    writeln!(
        out,
        "    public ResponseEntity<{}> create(@Valid @RequestBody Create{}Dto createDto) {{",
        response, name
    )?;
    writeln!(out, "        {} saved = {}.create(createDto);", name, service)?;
    writeln!(out, "        return ResponseEntity.ok(new {}(saved));", response)?;
    writeln!(out, "    }}")?;
    writeln!(out)?;

    writeln!(out, "    @PutMapping(\"/{{id}}\")")?;
    writeln!(
        out,
        "    public ResponseEntity<{}> update(@PathVariable Long id, @RequestBody Update{}Dto updateDto) {{",
        response, name
    )?;
    writeln!(out, "        {} updated = {}.update(id, updateDto);", name, service)?;
    writeln!(out, "        if (updated == null) {{")?;
    writeln!(out, "            return ResponseEntity.notFound().build();")?;
    writeln!(out, "        }}")?;
    writeln!(out, "        return ResponseEntity.ok(new {}(updated));", response)?;
    writeln!(out, "    }}")?;
    writeln!(out)?;

    writeln!(out, "    @DeleteMapping(\"/{{id}}\")")?;
    writeln!(out, "    public ResponseEntity<String> delete(@PathVariable Long id) {{")?;
    writeln!(out, "        if ({}.findById(id) == null) {{", service)?;
    writeln!(out, "            return ResponseEntity.notFound().build();")?;
    writeln!(out, "        }}")?;
    writeln!(out, "        {}.deleteById(id);", service)?;
    writeln!(
        out,
        "        return ResponseEntity.ok(\"{} with id \" + id + \" deleted successfully.\");",
        escape_java_string(name)
    )?;
    writeln!(out, "    }}")?;
    writeln!(out, "}}")?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::types::NodeKind;

    #[test]
    fn test_controller_routes() {
        let entity = Entity::new(1, "OrderItem", NodeKind::Standard);
        let java = generate_controller_java(&entity, &ServerConfig::default()).unwrap();

        assert!(java.contains("@RequestMapping(path = \"api/order-items\")"));
        assert!(java.contains("List<OrderItem> orderItems = orderItemService.findAll();"));
        assert!(java.contains("OrderItemResponseDto.withRelations(orderItem)"));
        assert!(java.contains(".map(OrderItemResponseDto::new)"));
        assert!(java.contains("\"OrderItem with id \" + id + \" deleted successfully.\""));
        assert!(java.contains("@GetMapping(\"/{id}\")"));
    }

    #[test]
    fn test_empty_prefix() {
        let entity = Entity::new(1, "City", NodeKind::Standard);
        let config = ServerConfig {
            api_prefix: "/".to_string(),
            ..Default::default()
        };
        assert_eq!(controller_path(&entity, &config), "cities");
    }
}
