use arbor_shared::{Identity, Message, MessageKind, Serde, SerdeErr, WireReader, WireWrite};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GetChild {
    pub name: String,
}

impl Serde for GetChild {
    fn ser(&self, writer: &mut dyn WireWrite) {
        self.name.ser(writer);
    }

    fn de(reader: &mut WireReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            name: String::de(reader)?,
        })
    }
}

impl Message for GetChild {
    const KIND: MessageKind = MessageKind::new(9);
    const NAME: &'static str = "GetChild";
}

/// Identity of a child object and the peer that owns it
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChildInfo {
    pub id: Identity,
    pub owner: Identity,
}

impl Serde for ChildInfo {
    fn ser(&self, writer: &mut dyn WireWrite) {
        self.id.ser(writer);
        self.owner.ser(writer);
    }

    fn de(reader: &mut WireReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            id: Identity::de(reader)?,
            owner: Identity::de(reader)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GetChildResponse {
    pub child: Option<ChildInfo>,
}

impl Serde for GetChildResponse {
    fn ser(&self, writer: &mut dyn WireWrite) {
        self.child.ser(writer);
    }

    fn de(reader: &mut WireReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            child: Option::<ChildInfo>::de(reader)?,
        })
    }
}

impl Message for GetChildResponse {
    const KIND: MessageKind = MessageKind::new(10);
    const NAME: &'static str = "GetChildResponse";
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateChild {
    pub name: String,
}

impl Serde for CreateChild {
    fn ser(&self, writer: &mut dyn WireWrite) {
        self.name.ser(writer);
    }

    fn de(reader: &mut WireReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            name: String::de(reader)?,
        })
    }
}

impl Message for CreateChild {
    const KIND: MessageKind = MessageKind::new(11);
    const NAME: &'static str = "CreateChild";
}

/// `None` when the name is already taken under the parent
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateChildResponse {
    pub child: Option<Identity>,
}

impl Serde for CreateChildResponse {
    fn ser(&self, writer: &mut dyn WireWrite) {
        self.child.ser(writer);
    }

    fn de(reader: &mut WireReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            child: Option::<Identity>::de(reader)?,
        })
    }
}

impl Message for CreateChildResponse {
    const KIND: MessageKind = MessageKind::new(12);
    const NAME: &'static str = "CreateChildResponse";
}
