//! Builds the `params` of a request from the arguments captured by a method stub.
use super::envelope::Params;
use crate::{
    descriptor::MethodDescriptor, error::RequestEncodeError, proxy::ParameterStructure,
    transform::Argument,
};

/// Transforms every argument into its JSON representation and arranges them in the parameter
/// structure of the method.
///
/// Fails on the first argument that cannot be represented, so no partial params are ever built.
pub(crate) fn build(
    method: &MethodDescriptor,
    arguments: Vec<Argument>,
) -> Result<Params, RequestEncodeError> {
    let values = arguments
        .into_iter()
        .enumerate()
        .map(|(index, argument)| {
            argument
                .into_wire()
                .map_err(|source| RequestEncodeError::Argument {
                    method: method.name().to_string(),
                    index,
                    source,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let params = match method.parameter_structure() {
        ParameterStructure::ByName => Params::ByName(
            method
                .param_names()
                .iter()
                .cloned()
                .zip(values)
                .collect(),
        ),
        ParameterStructure::ByPosition => Params::ByPosition(values),
    };

    Ok(params)
}
