use std::fmt::Write;

use crate::codegen::error::ArtifactError;
use crate::codegen::types::{Entity, FieldType};
use crate::codegen::utils::to_snake_case;

use super::{dart_type, ClientConfig};

/// JSON decoding expression for a scalar field
fn from_json_expr(key: &str, field_type: FieldType) -> String {
    match field_type {
        FieldType::Decimal => format!("(json['{}'] as num?)?.toDouble()", key),
        FieldType::Integer | FieldType::Long => format!("(json['{}'] as num?)?.toInt()", key),
        FieldType::Boolean => format!("json['{}'] as bool?", key),
        FieldType::String | FieldType::Date | FieldType::DateTime => {
            format!("json['{}']?.toString()", key)
        }
    }
}

/// Generate the client model with `fromJson`/`toJson`.
///
/// Relations are nested models: a list for to-many, a nullable object for
/// to-one. Owning to-one relations also carry the foreign-key id that
/// `toJson` sends to the server.
pub fn generate_model_dart(entity: &Entity, config: &ClientConfig) -> Result<String, ArtifactError> {
    let mut out = String::new();
    let name = &entity.name;
    let mapping = config.type_mapping;

    let mut related_stems: Vec<String> = Vec::new();
    for relation in &entity.relations {
        let stem = to_snake_case(&relation.target);
        if relation.target != *name && !related_stems.contains(&stem) {
            related_stems.push(stem);
        }
    }
    for stem in &related_stems {
        writeln!(out, "import '{}_model.dart';", stem)?;
    }
    if !related_stems.is_empty() {
        writeln!(out)?;
    }

    writeln!(out, "class {} {{", name)?;
    writeln!(out, "  final int? id;")?;
    for attr in &entity.attributes {
        writeln!(out, "  final {}? {};", dart_type(mapping.resolve(attr)), attr.name)?;
    }
    for relation in &entity.relations {
        if relation.is_to_many() {
            writeln!(out, "  final List<{}> {};", relation.target, relation.field_name())?;
        } else {
            if relation.owns_foreign_key() {
                writeln!(out, "  final int? {};", relation.id_field_name())?;
            }
            writeln!(out, "  final {}? {};", relation.target, relation.field_name())?;
        }
    }
    writeln!(out)?;

    // Constructor
    writeln!(out, "  {}({{", name)?;
    writeln!(out, "    this.id,")?;
    for attr in &entity.attributes {
        writeln!(out, "    this.{},", attr.name)?;
    }
    for relation in &entity.relations {
        if relation.is_to_many() {
            writeln!(out, "    this.{} = const [],", relation.field_name())?;
        } else {
            if relation.owns_foreign_key() {
                writeln!(out, "    this.{},", relation.id_field_name())?;
            }
            writeln!(out, "    this.{},", relation.field_name())?;
        }
    }
    writeln!(out, "  }});")?;
    writeln!(out)?;

    // fromJson
    writeln!(out, "  factory {}.fromJson(Map<String, dynamic> json) {{", name)?;
    writeln!(out, "    return {}(", name)?;
    writeln!(out, "      id: (json['id'] as num?)?.toInt(),")?;
    for attr in &entity.attributes {
        writeln!(
            out,
            "      {}: {},",
            attr.name,
            from_json_expr(&attr.name, mapping.resolve(attr))
        )?;
    }
    for relation in &entity.relations {
        let field = relation.field_name();
        if relation.is_to_many() {
            writeln!(out, "      {}: (json['{}'] as List<dynamic>? ?? [])", field, field)?;
            writeln!(
                out,
                "          .map((item) => {}.fromJson(item as Map<String, dynamic>))",
                relation.target
            )?;
            writeln!(out, "          .toList(),")?;
        } else {
            if relation.owns_foreign_key() {
                let id_field = relation.id_field_name();
                writeln!(out, "      {}: (json['{}'] as num?)?.toInt(),", id_field, id_field)?;
            }
            writeln!(out, "      {}: json['{}'] != null", field, field)?;
            writeln!(
                out,
                "          ? {}.fromJson(json['{}'] as Map<String, dynamic>)",
                relation.target, field
            )?;
            writeln!(out, "          : null,")?;
        }
    }
    writeln!(out, "    );")?;
    writeln!(out, "  }}")?;
    writeln!(out)?;

    // toJson: scalars plus owned foreign keys
    writeln!(out, "  Map<String, dynamic> toJson() {{")?;
    writeln!(out, "    return {{")?;
    writeln!(out, "      if (id != null) 'id': id,")?;
    for attr in &entity.attributes {
        writeln!(out, "      '{}': {},", attr.name, attr.name)?;
    }
    for relation in entity.owned_foreign_keys() {
        let id_field = relation.id_field_name();
        writeln!(out, "      '{}': {},", id_field, id_field)?;
    }
    writeln!(out, "    }};")?;
    writeln!(out, "  }}")?;
    writeln!(out, "}}")?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::types::{NodeKind, RelationDescriptor, TypeMapping};

    #[test]
    fn test_model_fields_and_relations() {
        let mut order = Entity::new(1, "Order", NodeKind::Standard).with_attribute("total", "double");
        order.relations.push(RelationDescriptor::many_to_one("Customer"));
        order
            .relations
            .push(RelationDescriptor::one_to_many("OrderItem", "order"));

        let dart = generate_model_dart(&order, &ClientConfig::default()).unwrap();

        assert!(dart.contains("import 'customer_model.dart';"));
        assert!(dart.contains("import 'order_item_model.dart';"));
        assert!(dart.contains("  final String? total;"));
        assert!(dart.contains("  final int? customerId;"));
        assert!(dart.contains("  final Customer? customer;"));
        assert!(dart.contains("  final List<OrderItem> orderItems;"));
        assert!(dart.contains("this.orderItems = const [],"));
        assert!(dart.contains("'customerId': customerId,"));
        assert!(!dart.contains("'orderItems':"));
    }

    #[test]
    fn test_declared_types_decode() {
        let product = Entity::new(1, "Product", NodeKind::Standard)
            .with_attribute("price", "double")
            .with_attribute("active", "bool");
        let config = ClientConfig {
            type_mapping: TypeMapping::Declared,
            ..Default::default()
        };
        let dart = generate_model_dart(&product, &config).unwrap();

        assert!(dart.contains("  final double? price;"));
        assert!(dart.contains("price: (json['price'] as num?)?.toDouble(),"));
        assert!(dart.contains("active: json['active'] as bool?,"));
    }

    #[test]
    fn test_self_reference_has_no_self_import() {
        let mut employee = Entity::new(1, "Employee", NodeKind::Standard);
        employee.relations.push(RelationDescriptor::many_to_one("Employee"));
        let dart = generate_model_dart(&employee, &ClientConfig::default()).unwrap();

        assert!(!dart.contains("import"));
        assert!(dart.contains("  final Employee? employee;"));
    }
}
