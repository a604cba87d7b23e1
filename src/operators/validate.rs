use crate::diagnostics::{messages, ErrorCode, Flag};

use super::{AppSyntax, ArgForm, ArgShape, OpKind};

/// Checks an application against a fixed arity and a per position shape. Every mismatch is reported as
/// a `BadSyntax` flag naming the operator.
pub fn validate_shape(
    name: &str,
    arity: usize,
    shape: impl Fn(usize) -> ArgShape,
    app: &AppSyntax,
    program: &str,
    flags: &mut Vec<Flag>,
) -> bool {
    if app.args.len() != arity {
        flags.push(Flag::error(
            app.location,
            messages::bad_arity(name, arity, app.args.len()),
            ErrorCode::BadSyntax,
            program,
        ));
        return false;
    }

    let mut ok = true;
    for (pos, arg) in app.args.iter().enumerate() {
        let message = match (shape(pos), arg) {
            (ArgShape::Forbidden, ArgForm::Comprehension) => {
                messages::comprehension_forbidden(name, pos)
            }
            (ArgShape::Required, ArgForm::Expr) => messages::comprehension_required(name, pos),
            _ => continue,
        };
        flags.push(Flag::error(
            app.location,
            message,
            ErrorCode::BadSyntax,
            program,
        ));
        ok = false;
    }
    ok
}

/// Validates an application of a built-in operator.
pub fn validate_builtin(kind: OpKind, app: &AppSyntax, program: &str, flags: &mut Vec<Flag>) -> bool {
    validate_shape(
        kind.get_name(),
        kind.arity(),
        |pos| kind.arg_shape(pos),
        app,
        program,
        flags,
    )
}
